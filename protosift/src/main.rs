use std::path::{Path, PathBuf};

use clap::Parser;
use miette::Result;
use protosift::{
    file::{Filesystem, OsFilesystem},
    Error, Loader, Schema,
};

#[derive(Debug, Parser)]
pub struct Args {
    /// The schema file(s) to compile, or directories to search for them.
    #[clap(value_name = "PROTO_FILES", required = true, value_parser)]
    files: Vec<PathBuf>,
    /// The directory in which to search for imports.
    #[clap(
        short = 'I',
        long = "include",
        visible_alias = "proto_path",
        value_name = "PATH",
        default_value = ".",
        value_parser
    )]
    includes: Vec<PathBuf>,
    /// Root types to retain, with everything they transitively reference. All other declarations are dropped.
    #[clap(long = "roots", value_name = "TYPES", value_delimiter = ',', value_parser)]
    roots: Vec<String>,
}

pub fn main() -> Result<()> {
    miette::set_panic_hook();

    let args = Args::parse();

    let filesystem = OsFilesystem::new();
    let mut files = Vec::new();
    for path in args.files {
        if filesystem.is_directory(&path) {
            collect_schema_files(&filesystem, &path, &mut files)?;
        } else {
            files.push(path);
        }
    }

    let schema = Loader::new(args.includes).load(files)?.fully_qualify()?;
    let schema = if args.roots.is_empty() {
        schema
    } else {
        schema.retain_roots(&args.roots)?
    };

    print_schema(&schema);
    Ok(())
}

fn collect_schema_files(
    filesystem: &OsFilesystem,
    directory: &Path,
    files: &mut Vec<PathBuf>,
) -> Result<(), Error> {
    for entry in filesystem.list_files(directory)? {
        if filesystem.is_directory(&entry) {
            collect_schema_files(filesystem, &entry, files)?;
        } else if entry.extension().map_or(false, |extension| extension == "proto") {
            files.push(entry);
        }
    }
    Ok(())
}

fn print_schema(schema: &Schema) {
    for file in &schema.files {
        println!("{}:", file.file_name);
        for ty in &file.types {
            println!("  {}", ty.fully_qualified_name());
        }
        for service in &file.services {
            println!("  {}", service.fully_qualified_name);
        }
    }
}
