use es2ts::byte_source::ByteSource;
use es2ts::config::PipelineConfig;
use es2ts::logger::LogCrateLogger;
use es2ts::pipeline::Pipeline;
use std::env;
use std::fs::File;
use std::io::{stdout, BufWriter};

fn main() {
    pretty_env_logger::init();
    let mut args = env::args();
    if args.len() < 2 {
        panic!("usage: convert <es-file> [out.ts]");
    }
    args.next(); // argv[0]
    let input_path = args.next().unwrap();
    let output_path = args.next();

    let input = File::open(&input_path).expect("unable to open input");
    let logger = LogCrateLogger;
    let pipeline = Pipeline::new(PipelineConfig::default(), &logger).expect("invalid config");
    let source = ByteSource::new(input);

    let summary = match output_path {
        Some(path) => {
            let mut sink = BufWriter::new(File::create(path).expect("unable to create output"));
            pipeline
                .run(source, &mut sink, true)
                .expect("conversion failed")
        }
        None => {
            let mut sink = BufWriter::new(stdout());
            pipeline
                .run(source, &mut sink, true)
                .expect("conversion failed")
        }
    };

    eprintln!(
        "wrote {} ES unit(s) as {:?}{}",
        summary.units_written,
        summary.stream_type,
        if summary.stopped_early {
            " (budget reached)"
        } else {
            ""
        }
    );
}
