use std::path::PathBuf;

/*
 * Hand-rolled argument parsing in the same style the rest of this crate's
 * ancestor used for its own CLI surface, narrowed to the options this
 * tool actually exposes: a single positional max file path plus one of
 * three mutually exclusive query flags (the default with none of them
 * set is the camera list).
 */
#[derive(Debug, Clone)]
pub enum Request {
    Props,
    ParseStream(String),
    DumpStream(String),
    CameraList,
}

#[derive(Debug, Clone)]
pub struct Args {
    pub file_path: PathBuf,
    pub request: Request,
}

pub fn parse_args<I: Iterator<Item = String>>(mut argv: I) -> Result<Args, String> {
    let program = argv.next().unwrap_or_else(|| "maxdump".to_string());

    let mut file_path: Option<PathBuf> = None;
    let mut props = false;
    let mut parse_stream: Option<String> = None;
    let mut dump_stream: Option<String> = None;

    let rest: Vec<String> = argv.collect();
    let mut i = 0;

    while i < rest.len() {
        let arg = rest[i].clone();

        match arg.as_str() {
            "--props" => {
                props = true;
                i += 1;
            }
            "--parse-stream" => {
                parse_stream = Some(take_value(&rest, i, "--parse-stream")?);
                i += 2;
            }
            "--dump-stream" => {
                dump_stream = Some(take_value(&rest, i, "--dump-stream")?);
                i += 2;
            }
            "-h" | "--help" => {
                return Err(usage(&program));
            }
            _ if arg.starts_with("--") => {
                return Err(format!("unrecognized option '{arg}'\n\n{}", usage(&program)));
            }
            _ => {
                if file_path.is_some() {
                    return Err(format!(
                        "unexpected extra argument '{arg}'\n\n{}",
                        usage(&program)
                    ));
                }
                file_path = Some(PathBuf::from(arg));
                i += 1;
            }
        }
    }

    let set_count = [props, parse_stream.is_some(), dump_stream.is_some()]
        .iter()
        .filter(|v| **v)
        .count();

    if set_count > 1 {
        return Err(format!(
            "--props, --parse-stream and --dump-stream are mutually exclusive\n\n{}",
            usage(&program)
        ));
    }

    let file_path = file_path.ok_or_else(|| usage(&program))?;

    let request = if props {
        Request::Props
    } else if let Some(name) = parse_stream {
        Request::ParseStream(name)
    } else if let Some(name) = dump_stream {
        Request::DumpStream(name)
    } else {
        Request::CameraList
    };

    return Ok(Args { file_path, request });
}

fn take_value(rest: &[String], i: usize, flag: &str) -> Result<String, String> {
    return rest
        .get(i + 1)
        .cloned()
        .ok_or_else(|| format!("{flag} requires a stream name argument"));
}

fn usage(program: &str) -> String {
    format!(
        "usage: {program} [--props | --parse-stream NAME | --dump-stream NAME] FILE\n\n\
         Reads a 3ds Max scene file and lists its camera objects by default.\n\n\
         options:\n  \
         --props                 emit document-summary properties as JSON\n  \
         --parse-stream NAME     emit the decoded contents of stream NAME as JSON\n  \
         --dump-stream NAME      emit the raw bytes of stream NAME as hex"
    )
}
