//! Solution descriptor rendering (Visual Studio `.sln` text format).

use meridian_core::{Module, ProjectId};

use crate::csproj::PROJECT_EXTENSION;

pub const SOLUTION_EXTENSION: &str = "sln";

/// Project type identifier for C# projects.
pub const CSHARP_PROJECT_TYPE: &str = "FAE04EC0-301F-11D3-BF4B-00C04F79EFBC";

const HEADER: &str = "Microsoft Visual Studio Solution File, Format Version 12.00\n# Visual Studio 15\n";

/// One `Project(...) ... EndProject` block per module, in input order.
///
/// Names are written verbatim; callers reject names containing `"`.
pub fn render_solution<'a>(modules: impl IntoIterator<Item = &'a Module>) -> String {
    let mut out = String::from(HEADER);
    for module in modules {
        let id = ProjectId::for_name(&module.name);
        out.push_str(&format!(
            "Project(\"{{{CSHARP_PROJECT_TYPE}}}\") = \"{name}\", \"{name}.{PROJECT_EXTENSION}\", \"{braced}\"\n",
            name = module.name,
            braced = id.braced(),
        ));
        out.push_str("EndProject\n");
    }
    out
}
