use crate::spec::{
    drom::Drom,
    types::hw::{Endian, Variant, UINST_BYTES},
};
use ansi_term::Colour;
use anyhow::{Context, Result};
use log::info;
use std::{
    ffi::OsString,
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};
use structopt::StructOpt;

#[cfg(windows)]
pub fn terminal_init() {
    ansi_term::enable_ansi_support().expect("Couldn't enable ANSI colours on this terminal");
}

#[cfg(not(windows))]
pub fn terminal_init() {}

/// `RUST_LOG` picks the verbosity, warnings and up by default.
pub fn logger_init() {
    // A second initialisation (e.g. from tests) is harmless.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();
}

/// Where `-be` may appear: straight after `mkdrom`, or after `sedicipu2 <variant>`.
pub const MKDROM_FLAG_POS: usize = 1;
pub const ROOT_FLAG_POS: usize = 2;

/// The historical tools take a single-dash `-be`, which the parser would read as `-b -e`.
/// It is only recognised in the flag position `pos`, as the tools always required.
pub fn normalize_args<I>(args: I, pos: usize) -> Vec<OsString>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    args.into_iter()
        .map(Into::<OsString>::into)
        .enumerate()
        .map(|(i, arg)| {
            if i == pos && arg == "-be" {
                OsString::from("--be")
            } else {
                arg
            }
        })
        .collect()
}

/// Paint the error prefix only for a terminal, so captured stderr stays plain text.
pub fn error_prefix(colour: bool) -> String {
    if colour {
        Colour::Red.bold().paint("error").to_string()
    } else {
        String::from("error")
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = "sedicipu2")]
pub enum CommandRoot {
    /// Generate the decode ROM of the full (11 instruction bit) machine
    Full(SubcommandMkdrom),
    /// Generate the decode ROM of the mini (8 instruction bit) machine
    Mini(SubcommandMkdrom),
}

#[derive(StructOpt, Debug)]
#[structopt(name = "mkdrom")]
pub struct SubcommandMkdrom {
    /// Write each ROM word big-endian
    #[structopt(long)]
    pub be: bool,

    /// Also write a human-readable listing of every entry
    #[structopt(long, value_name = "listing.txt", parse(from_os_str))]
    pub listing: Option<PathBuf>,

    #[structopt(name = "output_file", parse(from_os_str))]
    pub out: PathBuf,
}

impl SubcommandMkdrom {
    /// Parse the arguments of a standalone generator binary called `name`.
    pub fn from_args_named<I>(name: &str, args: I) -> SubcommandMkdrom
    where
        I: IntoIterator,
        I::Item: Into<OsString>,
    {
        let matches = SubcommandMkdrom::clap()
            .name(name)
            .get_matches_from(normalize_args(args, MKDROM_FLAG_POS));
        SubcommandMkdrom::from_clap(&matches)
    }

    pub fn endian(&self) -> Endian {
        if self.be {
            Endian::Big
        } else {
            Endian::Little
        }
    }
}

pub fn root(cmd: CommandRoot) -> ! {
    match cmd {
        CommandRoot::Full(scmd) => mkdrom(Variant::Full, scmd),
        CommandRoot::Mini(scmd) => mkdrom(Variant::Mini, scmd),
    };
}

pub fn mkdrom(variant: Variant, cmd: SubcommandMkdrom) -> ! {
    match generate(variant, &cmd) {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            eprintln!(
                "{}: {:?}",
                error_prefix(atty::is(atty::Stream::Stderr)),
                err
            );
            std::process::exit(1);
        }
    }
}

pub fn generate(variant: Variant, cmd: &SubcommandMkdrom) -> Result<()> {
    let drom = Drom::generate(variant);

    let endian = cmd.endian();
    write_file(&cmd.out, |w| drom.write_to(w, endian))?;
    info!(
        "wrote {} bytes ({}) to {}",
        drom.len() * UINST_BYTES,
        endian,
        cmd.out.display()
    );

    if let Some(path) = &cmd.listing {
        write_file(path, |w| drom.write_listing(w))?;
        info!("wrote listing to {}", path.display());
    }

    Ok(())
}

fn write_file<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let file =
        File::create(path).with_context(|| format!("Can't create file \"{}\"", path.display()))?;

    let mut w = BufWriter::new(file);
    body(&mut w)
        .and_then(|()| w.flush())
        .with_context(|| format!("Can't write to file \"{}\"", path.display()))
}
