//! Project descriptor rendering (MSBuild `.csproj` XML).

use std::borrow::Cow;
use std::path::Path;

use meridian_config::GenerationConfig;
use meridian_core::{Module, ProjectId};

pub const PROJECT_EXTENSION: &str = "csproj";

const MSBUILD_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";

/// Render the complete project descriptor for `module`.
///
/// Output depends only on the module and `config`, so regenerating an unchanged module
/// set is byte-identical.
pub fn render_project(module: &Module, config: &GenerationConfig) -> String {
    let mut out = XmlLines::default();
    let name = escape(&module.name);
    let defines = escape_owned(module.defines.join(";"));
    let no_warn = escape_owned(config.no_warn.join(";"));

    out.line(0, r#"<?xml version="1.0" encoding="utf-8"?>"#);
    out.line(
        0,
        format!(
            r#"<Project ToolsVersion="Current" DefaultTargets="Build" xmlns="{MSBUILD_NAMESPACE}">"#
        ),
    );

    out.line(1, "<PropertyGroup>");
    out.line(
        2,
        r#"<Configuration Condition=" '$(Configuration)' == '' ">Debug</Configuration>"#,
    );
    out.line(2, r#"<Platform Condition=" '$(Platform)' == '' ">AnyCPU</Platform>"#);
    out.line(2, "<ProductVersion>10.0.20506</ProductVersion>");
    out.line(2, "<SchemaVersion>2.0</SchemaVersion>");
    out.line(
        2,
        format!(
            "<ProjectGuid>{}</ProjectGuid>",
            ProjectId::for_name(&module.name).braced()
        ),
    );
    out.line(2, "<OutputType>Library</OutputType>");
    out.line(2, format!("<AssemblyName>{name}</AssemblyName>"));
    out.line(
        2,
        format!(
            "<TargetFrameworkVersion>{}</TargetFrameworkVersion>",
            escape(&config.target_framework_version)
        ),
    );
    out.line(2, "<FileAlignment>512</FileAlignment>");
    out.line(2, "<BaseDirectory>.</BaseDirectory>");
    out.line(
        2,
        format!("<LangVersion>{}</LangVersion>", escape(&config.lang_version)),
    );
    out.line(2, format!("<DefineConstants>{defines}</DefineConstants>"));
    out.line(2, "<ErrorReport>prompt</ErrorReport>");
    out.line(2, "<WarningLevel>4</WarningLevel>");
    out.line(2, "<TreatWarningsAsErrors>false</TreatWarningsAsErrors>");
    out.line(2, "<AllowUnsafeBlocks>true</AllowUnsafeBlocks>");
    out.line(2, "<DebugSymbols>true</DebugSymbols>");
    out.line(2, "<DebugType>full</DebugType>");
    out.line(2, "<Optimize>false</Optimize>");
    out.line(2, "<OutputPath>Temp/bin/Debug/</OutputPath>");
    out.line(2, "<IntermediateOutputPath>Temp/obj/Debug/</IntermediateOutputPath>");
    out.line(2, format!("<NoWarn>{no_warn}</NoWarn>"));
    out.line(1, "</PropertyGroup>");

    out.line(
        1,
        r#"<PropertyGroup Condition=" '$(Configuration)|$(Platform)' == 'Debug|AnyCPU' ">"#,
    );
    out.line(2, "<DebugSymbols>true</DebugSymbols>");
    out.line(2, "<DebugType>full</DebugType>");
    out.line(2, "<Optimize>false</Optimize>");
    out.line(2, "<OutputPath>Temp/bin/Debug/</OutputPath>");
    out.line(2, format!("<DefineConstants>{defines}</DefineConstants>"));
    out.line(2, "<ErrorReport>prompt</ErrorReport>");
    out.line(2, "<WarningLevel>4</WarningLevel>");
    out.line(1, "</PropertyGroup>");

    out.line(
        1,
        r#"<PropertyGroup Condition=" '$(Configuration)|$(Platform)' == 'Release|AnyCPU' ">"#,
    );
    out.line(2, "<DebugType>pdbonly</DebugType>");
    out.line(2, "<Optimize>true</Optimize>");
    out.line(2, "<OutputPath>Temp/bin/Release/</OutputPath>");
    out.line(2, format!("<DefineConstants>{defines}</DefineConstants>"));
    out.line(2, "<ErrorReport>prompt</ErrorReport>");
    out.line(2, "<WarningLevel>4</WarningLevel>");
    out.line(1, "</PropertyGroup>");

    out.line(1, "<ItemGroup>");
    for reference in &module.compiled_references {
        let location = reference.to_string_lossy();
        out.line(
            2,
            format!(
                r#"<Reference Include="{}">"#,
                escape(&reference_display_name(reference))
            ),
        );
        out.line(3, format!("<HintPath>{}</HintPath>", escape(&location)));
        out.line(3, "<Private>False</Private>");
        out.line(2, "</Reference>");
    }
    out.line(1, "</ItemGroup>");

    out.line(1, "<ItemGroup>");
    for source in &module.source_files {
        out.line(
            2,
            format!(r#"<Compile Include="{}" />"#, escape(&source.to_string_lossy())),
        );
    }
    out.line(1, "</ItemGroup>");

    out.line(1, "<ItemGroup>");
    for referenced in &module.module_references {
        let referenced_name = escape(referenced);
        out.line(
            2,
            format!(r#"<ProjectReference Include="{referenced_name}.{PROJECT_EXTENSION}">"#),
        );
        out.line(
            3,
            format!(
                "<Project>{}</Project>",
                ProjectId::for_name(referenced).braced()
            ),
        );
        out.line(3, format!("<Name>{referenced_name}</Name>"));
        out.line(3, "<ReferenceOutputAssembly>false</ReferenceOutputAssembly>");
        out.line(2, "</ProjectReference>");
    }
    out.line(1, "</ItemGroup>");

    out.line(
        1,
        r#"<Import Project="$(MSBuildToolsPath)\Microsoft.CSharp.targets" />"#,
    );
    out.line(0, "</Project>");

    out.finish()
}

/// `UnityEngine.CoreModule.dll` -> `UnityEngine.CoreModule`.
fn reference_display_name(path: &Path) -> Cow<'_, str> {
    match path.file_stem() {
        Some(stem) => stem.to_string_lossy(),
        None => path.to_string_lossy(),
    }
}

#[derive(Default)]
struct XmlLines {
    buf: String,
}

impl XmlLines {
    fn line(&mut self, depth: usize, text: impl AsRef<str>) {
        for _ in 0..depth {
            self.buf.push_str("  ");
        }
        self.buf.push_str(text.as_ref());
        self.buf.push('\n');
    }

    fn finish(self) -> String {
        self.buf
    }
}

fn escape_owned(text: String) -> String {
    escape(&text).into_owned()
}

/// Escape text for use in XML element content and double-quoted attributes.
pub(crate) fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}
