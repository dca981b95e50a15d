#![allow(dead_code)]

use sedicipu2::spec::{
    drom::Drom,
    types::hw::{DAddr, Phase, UInst, Variant},
};
use std::path::PathBuf;

pub fn first_phase(drom: &Drom) -> impl Iterator<Item = DAddr> + '_ {
    drom.iter()
        .map(|(addr, _, _)| addr)
        .filter(|addr| addr.phase() == Phase::First)
}

pub fn pair(drom: &Drom, addr: DAddr) -> (UInst, UInst) {
    (
        drom.word(addr.with_phase(Phase::First)),
        drom.word(addr.with_phase(Phase::Second)),
    )
}

/// A fresh path in the system temp directory, unique to this test process.
pub fn scratch_path(variant: Variant, tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "sedicipu2-{}-{}-{}",
        std::process::id(),
        variant,
        tag
    ))
}
