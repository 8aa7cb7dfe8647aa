mod cameras;
mod cfb_access;
mod chunk;
mod class;
mod cli;
mod dll;
mod error;
mod linker;
mod props;
mod reader;
mod serialize;

use std::process::ExitCode;

use cfb_access::CfbAccess;
use chunk::ChunkParser;
use class::ClassDecoder;
use cli::Request;
use error::MaxDumpError;

const PROPERTY_STREAM_NAME: &str = "\u{5}DocumentSummaryInformation";
const CLASS_DIRECTORY_STREAM: &str = "ClassDirectory3";
const DLL_DIRECTORY_STREAM: &str = "DllDirectory";
const SCENE_STREAM: &str = "Scene";

fn main() -> ExitCode {
    env_logger::init();

    let args = match cli::parse_args(std::env::args()) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = run(&args) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    return ExitCode::SUCCESS;
}

fn run(args: &cli::Args) -> Result<(), MaxDumpError> {
    match &args.request {
        Request::Props => run_props(args),
        Request::ParseStream(name) => run_parse_stream(args, name),
        Request::DumpStream(name) => run_dump_stream(args, name),
        Request::CameraList => run_camera_list(args),
    }
}

fn run_props(args: &cli::Args) -> Result<(), MaxDumpError> {
    let bytes = CfbAccess::open_stream(&args.file_path, PROPERTY_STREAM_NAME)?;
    let properties = props::PropertyParser::parse(&bytes)?;
    let json_value = serialize::properties_to_json(&properties);
    println!("{}", json_value.pretty(4));
    return Ok(());
}

fn run_dump_stream(args: &cli::Args, name: &str) -> Result<(), MaxDumpError> {
    let bytes = CfbAccess::open_stream(&args.file_path, name)?;
    println!("{}", serialize::hex_dump(&bytes));
    return Ok(());
}

fn run_parse_stream(args: &cli::Args, name: &str) -> Result<(), MaxDumpError> {
    let bytes = CfbAccess::open_stream(&args.file_path, name)?;

    let json_value = match name {
        DLL_DIRECTORY_STREAM => {
            let chunks = ChunkParser::parse(&bytes)?;
            let directory = dll::DllDecoder::decode(&chunks)?;
            serialize::dll_directory_to_json(&directory)
        }
        CLASS_DIRECTORY_STREAM => {
            let chunks = ChunkParser::parse(&bytes)?;
            let classes = ClassDecoder::decode(&chunks)?;
            let dlls = load_dll_entries(args)?;
            let linked = linker::link_classes_to_dlls(&classes, &dlls)?;
            serialize::linked_classes_to_json(&linked)
        }
        SCENE_STREAM => {
            let classes = load_class_entries(args)?;
            let top_level = ChunkParser::parse(&bytes)?;
            let objects = top_level.first().and_then(|c| c.children()).unwrap_or(&[]);
            let scene_entries = linker::annotate_scene(objects, &classes)?;
            serialize::scene_entries_to_json(&scene_entries)
        }
        _ => {
            let chunks = ChunkParser::parse(&bytes)?;
            serialize::chunks_to_json(&chunks)
        }
    };

    println!("{}", json_value.pretty(4));
    return Ok(());
}

fn run_camera_list(args: &cli::Args) -> Result<(), MaxDumpError> {
    let classes = load_class_entries(args)?;
    let scene_bytes = CfbAccess::open_stream(&args.file_path, SCENE_STREAM)?;
    let names = cameras::CameraQuery::list_camera_names(&scene_bytes, &classes)?;
    let json_value = serialize::camera_names_to_json(&names);
    println!("{}", json_value.pretty(4));
    return Ok(());
}

fn load_class_entries(args: &cli::Args) -> Result<Vec<class::ClassEntry>, MaxDumpError> {
    let bytes = CfbAccess::open_stream(&args.file_path, CLASS_DIRECTORY_STREAM)?;
    let chunks = ChunkParser::parse(&bytes)?;
    return ClassDecoder::decode(&chunks);
}

fn load_dll_entries(args: &cli::Args) -> Result<Vec<dll::DllEntry>, MaxDumpError> {
    let bytes = CfbAccess::open_stream(&args.file_path, DLL_DIRECTORY_STREAM)?;
    let chunks = ChunkParser::parse(&bytes)?;
    let directory = dll::DllDecoder::decode(&chunks)?;
    return Ok(directory.entries);
}
