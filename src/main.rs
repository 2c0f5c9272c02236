use clap::{arg,crate_version,ArgMatches,Command};
use std::io::{Cursor,Read,Write};
use huffpress::huffman;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

fn ok_to_overwrite(path_out: &str,force: bool) -> bool {
    if force {
        return true;
    }
    if let Ok(_f) = std::fs::File::open(path_out) {
        let mut ans = String::new();
        eprint!("{} exists, overwrite? (y/n) ",path_out);
        if std::io::stdin().read_line(&mut ans).is_err() {
            return false;
        }
        if ans.trim_end()=="y" || ans.trim_end()=="Y" {
            return true;
        }
        return false;
    }
    true
}

/// mode bits of the input file, or the standard permissions if unknown
#[cfg(unix)]
fn mode_of(path: &str) -> u16 {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(path) {
        Ok(meta) => (meta.permissions().mode() & 0o7777) as u16,
        Err(_) => huffpress::STD_OPTIONS.permissions
    }
}

#[cfg(not(unix))]
fn mode_of(_path: &str) -> u16 {
    huffpress::STD_OPTIONS.permissions
}

#[cfg(unix)]
fn set_mode(path: &str,mode: u16) -> STDRESULT {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path,std::fs::Permissions::from_mode(mode as u32))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &str,_mode: u16) -> STDRESULT {
    Ok(())
}

fn print_stats(compressed: u64,expanded: u64) {
    eprintln!("Compressed file size: {} bytes",compressed);
    eprintln!("Uncompressed file size: {} bytes",expanded);
    let saving = match expanded {
        0 => 0.0,
        x => 100.0 * (1.0 - compressed as f64 / x as f64)
    };
    eprintln!("Space saving: {:.2}%",saving);
}

/// Run one direction of the codec.  Standard input is buffered in memory since the
/// codec needs to seek, standard output is written after the codec is done.
fn run(cmd: &ArgMatches,compressing: bool) -> STDRESULT {
    let path_in = cmd.get_one::<String>("input");
    let path_out = cmd.get_one::<String>("output");
    let mut opt = huffpress::STD_OPTIONS;
    if let Some(path) = path_out {
        if !ok_to_overwrite(path,cmd.get_flag("force")) {
            eprintln!("abort operation");
            return Ok(());
        }
    }
    let mut in_file: Box<dyn ReadSeek> = match path_in {
        Some(path) => {
            opt.permissions = mode_of(path);
            Box::new(std::fs::File::open(path)?)
        },
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Box::new(Cursor::new(buf))
        }
    };
    let (in_size,out_size,mode) = match path_out {
        Some(path) => {
            let mut out_file = std::fs::OpenOptions::new().write(true).truncate(false).create(true).open(path)?;
            let (in_size,out_size,mode) = code(&mut in_file,&mut out_file,&opt,compressing)?;
            out_file.set_len(out_size)?;
            set_mode(path,mode)?;
            (in_size,out_size,mode)
        },
        None => {
            let mut out_buf = Cursor::new(Vec::new());
            let ans = code(&mut in_file,&mut out_buf,&opt,compressing)?;
            std::io::stdout().write_all(&out_buf.into_inner())?;
            ans
        }
    };
    log::info!("output mode {:o}",mode);
    if cmd.get_flag("stats") {
        match compressing {
            true => print_stats(out_size,in_size),
            false => print_stats(in_size,out_size)
        }
    }
    Ok(())
}

trait ReadSeek: Read + std::io::Seek {}
impl <T: Read + std::io::Seek> ReadSeek for T {}

/// returns (in_size,out_size,mode of the output)
fn code<R,W>(in_file: &mut R,out_file: &mut W,opt: &huffpress::Options,compressing: bool) -> Result<(u64,u64,u16),Box<dyn std::error::Error>>
where R: Read + std::io::Seek, W: Write + std::io::Seek {
    match compressing {
        true => {
            let (in_size,out_size) = huffman::compress(in_file,out_file,opt)?;
            Ok((in_size,out_size,opt.permissions))
        },
        false => {
            let header = huffman::read_header(in_file,opt)?;
            let (in_size,out_size) = huffman::expand(in_file,out_file,opt)?;
            Ok((in_size,out_size,header.permissions))
        }
    }
}

fn main() -> STDRESULT
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let long_help =
"Examples:
---------
Compress:      `huffpress compress -i my_expanded -o my_compressed`
Expand:        `huffpress expand -i my_compressed -o my_expanded`
Pipe:          `cat my_expanded | huffpress compress -v > my_compressed`";

    let mut main_cmd = Command::new("huffpress")
        .about("Compress and expand with static Huffman coding")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-i --input <PATH> "input path, default is stdin"))
        .arg(arg!(-o --output <PATH> "output path, default is stdout"))
        .arg(arg!(-v --stats "print compression statistics"))
        .arg(arg!(-f --force "overwrite output without asking"))
        .about("compress a file"));

    main_cmd = main_cmd.subcommand(Command::new("expand")
        .arg(arg!(-i --input <PATH> "input path, default is stdin"))
        .arg(arg!(-o --output <PATH> "output path, default is stdout"))
        .arg(arg!(-v --stats "print compression statistics"))
        .arg(arg!(-f --force "overwrite output without asking"))
        .about("expand a file"));

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        run(cmd,true)?;
    }

    if let Some(cmd) = matches.subcommand_matches("expand") {
        run(cmd,false)?;
    }

    Ok(())
}
