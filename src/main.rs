use std::env;
use std::io::Write;
use std::process;

use szst_reader::SzstReader;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-szst-file> [--frames | <start> <end>]", args[0]);
        process::exit(1);
    }

    let path = &args[1];
    let reader = match SzstReader::open(path) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("ERROR: Failed to open seekable archive");
            eprintln!("  {}", e);
            process::exit(1);
        }
    };

    // Range mode: write the requested decompressed bytes to stdout.
    if args.len() == 4 {
        let start: u64 = parse_offset(&args[2]);
        let end: u64 = parse_offset(&args[3]);
        match reader.read_range(start, end) {
            Ok(bytes) => {
                if let Err(e) = std::io::stdout().write_all(&bytes) {
                    eprintln!("ERROR: Failed to write output: {}", e);
                    process::exit(1);
                }
            }
            Err(e) => {
                eprintln!("ERROR: Failed to read range [{}, {})", start, end);
                eprintln!("  {}", e);
                process::exit(1);
            }
        }
        return;
    }

    let (size, frame_count) = match (reader.size(), reader.frame_count()) {
        (Ok(size), Ok(frame_count)) => (size, frame_count),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("ERROR: Failed to query archive: {}", e);
            process::exit(1);
        }
    };

    println!("Seekable archive: {}", path);
    println!("  Decompressed size: {} bytes", size);
    println!("  Frames: {}", frame_count);

    if args.iter().any(|arg| arg == "--frames") {
        println!();
        println!(
            "  {:>6}  {:>12}  {:>12}  {:>14}  {:>10}",
            "frame", "comp.offset", "comp.size", "decomp.offset", "decomp.size"
        );
        for (i, frame) in reader.frames().iter().enumerate() {
            println!(
                "  {:>6}  {:>12}  {:>12}  {:>14}  {:>10}",
                i,
                frame.compressed_offset,
                frame.compressed_size,
                frame.decompressed_offset,
                frame.decompressed_size
            );
        }
    }
}

fn parse_offset(arg: &str) -> u64 {
    match arg.parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("ERROR: Invalid offset: {}", arg);
            process::exit(1);
        }
    }
}
