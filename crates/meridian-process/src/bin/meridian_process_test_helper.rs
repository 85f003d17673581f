use std::{env, fs, process, thread, time::Duration};

fn parse_u64(value: Option<String>, flag: &str) -> u64 {
    let value = value.unwrap_or_else(|| {
        eprintln!("missing value for {flag}");
        process::exit(2);
    });
    value.parse().unwrap_or_else(|_| {
        eprintln!("invalid u64 for {flag}: {value}");
        process::exit(2);
    })
}

// Usage: meridian_process_test_helper [--sleep-ms N] --record PATH -- ARGS...
//
// Writes every argument after `--` to PATH, one per line, once the sleep has elapsed.
fn main() {
    let mut args = env::args().skip(1);
    let mut record = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sleep-ms" => {
                let ms = parse_u64(args.next(), "--sleep-ms");
                thread::sleep(Duration::from_millis(ms));
            }
            "--record" => {
                record = Some(args.next().unwrap_or_else(|| {
                    eprintln!("missing value for --record");
                    process::exit(2);
                }));
            }
            "--" => break,
            other => {
                eprintln!("unknown argument: {other}");
                process::exit(2);
            }
        }
    }

    let Some(record) = record else {
        return;
    };
    let rest: Vec<String> = args.collect();
    let tmp = format!("{record}.partial");
    let mut text = rest.join("\n");
    text.push('\n');
    if let Err(err) = fs::write(&tmp, text).and_then(|()| fs::rename(&tmp, &record)) {
        eprintln!("failed to record arguments: {err}");
        process::exit(2);
    }
}
