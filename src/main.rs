//! html2pdf – command-line HTML → PDF converter.
//!
//! Usage:
//!   html2pdf <input.html> [output.pdf] [--landscape] [--config opts.json]
//!            [--start-page N] [--title T] [--layout-json out.json]
//!   html2pdf --paste <target.pdf> [source.pdf ...]
//!   html2pdf --demo <output.pdf> [--image picture.png]
//!
//! If `output.pdf` is omitted the PDF is written next to the input file with
//! the same stem (e.g. `report.html` → `report.pdf`).

use std::{
    env, fs,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
    process,
};

use html2pdf::{paste, templates, Html2Pdf, Html2PdfOptions};

enum Mode {
    Render,
    Paste,
    Demo,
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("html2pdf");

    let mut mode = Mode::Render;
    let mut positional: Vec<PathBuf> = Vec::new();
    let mut landscape = false;
    let mut config_path: Option<PathBuf> = None;
    let mut start_page: Option<i32> = None;
    let mut title: Option<String> = None;
    let mut layout_json: Option<PathBuf> = None;
    let mut image: Option<String> = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--paste" => mode = Mode::Paste,
            "--demo" => mode = Mode::Demo,
            "--landscape" | "-l" => landscape = true,
            "--config" | "-c" => config_path = Some(PathBuf::from(value(&mut iter, arg, prog))),
            "--title" | "-t" => title = Some(value(&mut iter, arg, prog)),
            "--layout-json" => layout_json = Some(PathBuf::from(value(&mut iter, arg, prog))),
            "--image" => image = Some(value(&mut iter, arg, prog)),
            "--start-page" | "-s" => {
                let raw = value(&mut iter, arg, prog);
                match raw.parse() {
                    Ok(n) => start_page = Some(n),
                    Err(_) => fail(&format!("--start-page expects an integer, got '{raw}'")),
                }
            }
            "--help" | "-h" => {
                print_usage(prog);
                process::exit(0);
            }
            other if other.starts_with('-') && other.len() > 1 => {
                eprintln!("Unknown flag: {other}");
                print_usage(prog);
                process::exit(1);
            }
            path => positional.push(PathBuf::from(path)),
        }
    }

    match mode {
        Mode::Paste => run_paste(&positional, prog),
        Mode::Demo => run_demo(&positional, image.as_deref(), prog),
        Mode::Render => {
            if positional.is_empty() || positional.len() > 2 {
                eprintln!("Error: expected <input.html> [output.pdf].");
                print_usage(prog);
                process::exit(1);
            }
            let mut options = match &config_path {
                Some(path) => Html2PdfOptions::from_json_file(path)
                    .unwrap_or_else(|e| fail(&format!("'{}': {e}", path.display()))),
                None => Html2PdfOptions::default(),
            };
            if landscape {
                options = options.with_landscape(true);
            }
            if let Some(n) = start_page {
                options = options.with_start_page_number(n);
            }
            if let Some(t) = title {
                options = options.with_title(t);
            }
            run_render(&positional[0], positional.get(1), options, layout_json.as_deref());
        }
    }
}

fn run_render(input: &Path, output: Option<&PathBuf>, options: Html2PdfOptions, layout_json: Option<&Path>) {
    // Default output: same directory + same stem as input, but with .pdf
    let output = output.cloned().unwrap_or_else(|| input.with_extension("pdf"));
    let html = fs::read_to_string(input)
        .unwrap_or_else(|e| fail(&format!("reading '{}': {e}", input.display())));

    let rendered = Html2Pdf::new(options)
        .render(&html)
        .unwrap_or_else(|e| fail(&e.to_string()));
    write_file(&output, &rendered.bytes);

    if let Some(path) = layout_json {
        let json = rendered
            .layout
            .to_json()
            .unwrap_or_else(|e| fail(&format!("serialising layout: {e}")));
        write_file(path, json.as_bytes());
    }

    let pages = rendered.page_count();
    eprintln!(
        "Wrote '{}' ({} bytes, {} page{})",
        output.display(),
        rendered.bytes.len(),
        pages,
        if pages == 1 { "" } else { "s" }
    );
}

fn run_paste(positional: &[PathBuf], prog: &str) {
    let Some((target, sources)) = positional.split_first() else {
        eprintln!("Error: --paste needs a target file.");
        print_usage(prog);
        process::exit(1);
    };
    match paste(target, sources) {
        Ok(pages) => eprintln!(
            "Wrote '{}' ({} page{} from {} file{})",
            target.display(),
            pages,
            if pages == 1 { "" } else { "s" },
            sources.len(),
            if sources.len() == 1 { "" } else { "s" }
        ),
        Err(e) => fail(&format!("pasting into '{}': {e}", target.display())),
    }
}

fn run_demo(positional: &[PathBuf], image: Option<&str>, prog: &str) {
    let [output] = positional else {
        eprintln!("Error: --demo needs exactly one output file.");
        print_usage(prog);
        process::exit(1);
    };
    let html = templates::demo_template(image);
    let file = fs::File::create(output)
        .unwrap_or_else(|e| fail(&format!("creating '{}': {e}", output.display())));
    Html2Pdf::new(templates::demo_options())
        .run_reader(BufReader::new(html.as_bytes()), BufWriter::new(file))
        .unwrap_or_else(|e| fail(&e.to_string()));
    eprintln!("Wrote demo to '{}'", output.display());
}

fn value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str, prog: &str) -> String {
    match iter.next() {
        Some(v) => v.clone(),
        None => {
            eprintln!("Error: {flag} needs a value.");
            print_usage(prog);
            process::exit(1);
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) {
    // Create output directory if necessary.
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent) {
                fail(&format!("creating '{}': {e}", parent.display()));
            }
        }
    }
    if let Err(e) = fs::write(path, bytes) {
        fail(&format!("writing '{}': {e}", path.display()));
    }
}

fn fail(msg: &str) -> ! {
    eprintln!("Error: {msg}");
    process::exit(1);
}

fn print_usage(prog: &str) {
    eprintln!("html2pdf – HTML to PDF converter with page headers and footers");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <input.html> [output.pdf] [flags]");
    eprintln!("  {prog} --paste <target.pdf> [source.pdf ...]");
    eprintln!("  {prog} --demo <output.pdf> [--image picture.png]");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --config, -c       JSON options file (page, margins, header, footer)");
    eprintln!("  --landscape, -l    Rotate the page");
    eprintln!("  --start-page, -s   Page counter start; -N hides header/footer on N pages");
    eprintln!("  --title, -t        Document title in PDF metadata");
    eprintln!("  --layout-json      Also write the paginated layout as JSON");
    eprintln!("  --help             Print this message");
    eprintln!();
    eprintln!("With --paste and no sources the target is truncated to an empty file.");
}
