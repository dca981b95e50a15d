mod common;

use sedicipu2::{
    cli::command::{self, CommandRoot, SubcommandMkdrom},
    Drom, Endian, Variant,
};
use std::ffi::OsString;
use structopt::StructOpt;

#[test]
fn single_dash_be_is_normalized() {
    let args =
        command::normalize_args(vec!["mkdrom", "-be", "out.bin"], command::MKDROM_FLAG_POS);
    assert_eq!(
        args,
        vec![
            OsString::from("mkdrom"),
            OsString::from("--be"),
            OsString::from("out.bin")
        ]
    );

    let cmd = SubcommandMkdrom::from_iter(args);
    assert!(cmd.be);
    assert_eq!(cmd.endian(), Endian::Big);
    assert_eq!(cmd.out, std::path::PathBuf::from("out.bin"));
}

#[test]
fn single_dash_be_only_leads() {
    let args =
        command::normalize_args(vec!["mkdrom", "out.bin", "-be"], command::MKDROM_FLAG_POS);
    assert_eq!(args[2], OsString::from("-be"));
    assert!(SubcommandMkdrom::from_iter_safe(args).is_err());

    let args = command::normalize_args(
        vec!["sedicipu2", "full", "out.bin", "-be"],
        command::ROOT_FLAG_POS,
    );
    assert!(CommandRoot::from_iter_safe(args).is_err());
}

#[test]
fn error_prefix_is_plain_off_a_terminal() {
    assert_eq!(command::error_prefix(false), "error");
    let painted = command::error_prefix(true);
    assert!(painted.contains("error"));
    assert!(painted.starts_with('\u{1b}'));
}

#[test]
fn little_endian_by_default() {
    let cmd = SubcommandMkdrom::from_args_named("mkdrom-mini", vec!["mkdrom-mini", "out.bin"]);
    assert!(!cmd.be);
    assert!(cmd.listing.is_none());
}

#[test]
fn umbrella_subcommands() {
    let args = vec![
        "sedicipu2", "mini", "-be", "--listing", "mini.txt", "mini.bin",
    ];
    let root = CommandRoot::from_iter(command::normalize_args(args, command::ROOT_FLAG_POS));
    match root {
        CommandRoot::Mini(cmd) => {
            assert!(cmd.be);
            assert_eq!(cmd.listing, Some(std::path::PathBuf::from("mini.txt")));
        }
        other => panic!("parsed as {:?}", other),
    }
}

#[test]
fn missing_output_is_a_usage_error() {
    assert!(SubcommandMkdrom::from_iter_safe(vec!["mkdrom", "--be"]).is_err());
    assert!(SubcommandMkdrom::from_iter_safe(vec!["mkdrom", "a.bin", "b.bin"]).is_err());
}

#[test]
fn writes_the_image() {
    for variant in [Variant::Full, Variant::Mini].iter().copied() {
        for &be in [false, true].iter() {
            let out = common::scratch_path(variant, if be { "be.bin" } else { "le.bin" });
            let cmd = SubcommandMkdrom {
                be,
                listing: None,
                out: out.clone(),
            };
            command::generate(variant, &cmd).unwrap();

            let written = std::fs::read(&out).unwrap();
            std::fs::remove_file(&out).unwrap();
            assert_eq!(written.len(), variant.drom_len() * 4);
            assert_eq!(written, Drom::generate(variant).to_bytes(cmd.endian()));
        }
    }
}

#[test]
fn writes_the_listing() {
    let out = common::scratch_path(Variant::Full, "listing.bin");
    let listing = common::scratch_path(Variant::Full, "listing.txt");
    let cmd = SubcommandMkdrom {
        be: false,
        listing: Some(listing.clone()),
        out: out.clone(),
    };
    command::generate(Variant::Full, &cmd).unwrap();

    let text = std::fs::read_to_string(&listing).unwrap();
    std::fs::remove_file(&out).unwrap();
    std::fs::remove_file(&listing).unwrap();
    assert_eq!(text.lines().count(), 4096);
    assert!(text.lines().any(|line| line.ends_with("(???)")));
}

#[test]
fn uncreatable_output_is_reported() {
    let out = common::scratch_path(Variant::Mini, "missing-dir").join("drom.bin");
    let cmd = SubcommandMkdrom {
        be: false,
        listing: None,
        out,
    };
    let err = command::generate(Variant::Mini, &cmd).unwrap_err();
    assert!(err.to_string().starts_with("Can't create file \""), "{}", err);
}
