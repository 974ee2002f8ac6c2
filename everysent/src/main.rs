use std::{
    env,
    fs::File,
    io::{self, Read, Write},
    path::Path,
    process,
    str::FromStr,
};

use ebnfgram::{ebnf::ASTWithValidityInfo, NewlineCache};
use getopts::Options;
use sentgen::CompiledGrammar;

const ERROR: &str = "[Error]";

fn usage(prog: &str, msg: &str) -> ! {
    let path = Path::new(prog);
    let leaf = match path.file_name() {
        Some(m) => m.to_str().unwrap(),
        None => "everysent",
    };
    if !msg.is_empty() {
        eprintln!("{}", msg);
    }
    eprintln!("Usage: {} [-j] <grammar file>", leaf);
    process::exit(1);
}

// An unreadable grammar file is misuse, reported the same way as bad flags.
fn read_file<P: AsRef<Path>>(prog: &str, path: P) -> String {
    let mut f = match File::open(&path) {
        Ok(r) => r,
        Err(e) => usage(
            prog,
            &format!("Can't open file {}: {}", path.as_ref().display(), e),
        ),
    };
    let mut s = String::new();
    if let Err(e) = f.read_to_string(&mut s) {
        usage(
            prog,
            &format!("Can't read file {}: {}", path.as_ref().display(), e),
        );
    }
    s
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let prog = &args[0];
    let mut opts = Options::new();
    opts.optflag("h", "help", "print this help menu");
    opts.optflag("j", "json", "JSON-encode each emitted sentence");
    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => usage(prog, f.to_string().as_str()),
    };
    if matches.opt_present("h") || matches.free.len() != 1 {
        usage(prog, "");
    }
    let json = matches.opt_present("j");
    let grm_path = &matches.free[0];
    let src = read_file(prog, grm_path);

    let valid = ASTWithValidityInfo::new(&src);
    if !valid.is_valid() {
        report_errors(grm_path, &src, valid.errors());
        process::exit(2);
    }
    let grm = match CompiledGrammar::new(valid.ast()) {
        Ok(grm) => grm,
        Err(errs) => {
            report_errors(grm_path, &src, &errs);
            process::exit(2);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for sentence in grm.sentences() {
        let res = if json {
            serde_json::to_string(&sentence)
                .map_err(io::Error::from)
                .and_then(|enc| writeln!(out, "{}", enc))
        } else {
            writeln!(out, "{}", sentence)
        };
        if let Err(e) = res {
            // A consumer that stops reading (e.g. `everysent g.ebnf | head`) is the normal way
            // to end an infinite enumeration.
            if e.kind() == io::ErrorKind::BrokenPipe {
                process::exit(0);
            }
            eprintln!("{} {}", ERROR, e);
            process::exit(1);
        }
    }
}

fn report_errors(path: &str, src: &str, errs: &[ebnfgram::ebnf::GrammarError]) {
    let nlc = NewlineCache::from_str(src).unwrap();
    for e in errs {
        let mut locs = Vec::new();
        for span in e.spans() {
            match nlc.byte_to_line_num_and_col_num(src, span.start()) {
                Some((line, col)) => locs.push(format!("{}:{}", line, col)),
                None => locs.push(format!("byte {}", span.start())),
            }
        }
        eprintln!("{} {}:{}: {}", ERROR, path, locs.join(", "), e);
    }
}
