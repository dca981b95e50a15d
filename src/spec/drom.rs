use super::defs;
use super::types::{
    hw::{self, Byte, DAddr, Endian, UInst, Variant},
    schema::{Action, Slot, Table},
};
use derive_more::Display;
use log::{debug, info};
use std::io::{self, Write};

/// Who decided the contents of a ROM entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// Never claimed; still the default trap word.
    Trap,
    Rule(&'static str),
    /// Deliberately left as the trap word.
    Reserved(&'static str),
}

impl Owner {
    pub fn rule(&self) -> Option<&'static str> {
        match self {
            Owner::Rule(name) => Some(*name),
            _ => None,
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[display(
    fmt = "{} entries: {} claimed, {} reserved, {} trap",
    len,
    claimed,
    reserved,
    trap
)]
pub struct Summary {
    pub len: usize,
    pub claimed: usize,
    pub reserved: usize,
    pub trap: usize,
}

/// A complete decode ROM.
pub struct Drom {
    variant: Variant,
    data: Vec<UInst>,
    owners: Vec<Owner>,
}

impl Drom {
    pub fn generate(variant: Variant) -> Drom {
        let mut builder = Builder::new(variant);
        match variant {
            Variant::Full => defs::full::register(&mut builder),
            Variant::Mini => defs::mini::register(&mut builder),
        }
        builder.build()
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn words(&self) -> &[UInst] {
        &self.data
    }

    pub fn word(&self, addr: DAddr) -> UInst {
        assert_eq!(addr.variant(), self.variant);
        self.data[usize::from(addr)]
    }

    pub fn owner(&self, addr: DAddr) -> Owner {
        assert_eq!(addr.variant(), self.variant);
        self.owners[usize::from(addr)]
    }

    pub fn iter(&self) -> impl Iterator<Item = (DAddr, UInst, Owner)> + '_ {
        let variant = self.variant;
        self.data
            .iter()
            .zip(self.owners.iter())
            .enumerate()
            .map(move |(idx, (&ui, &owner))| (DAddr::from_index(variant, idx), ui, owner))
    }

    pub fn summary(&self) -> Summary {
        let trap = defs::uops::trap_word();
        let count = |f: fn(&Owner) -> bool| self.owners.iter().filter(|o| f(o)).count();
        Summary {
            len: self.len(),
            claimed: count(|o| o.rule().is_some()),
            reserved: count(|o| matches!(o, Owner::Reserved(_))),
            trap: self.data.iter().filter(|&&ui| ui == trap).count(),
        }
    }

    pub fn to_bytes(&self, endian: Endian) -> Vec<Byte> {
        hw::words_to_bytes(&self.data, endian)
    }

    /// Raw image: every word in address order.
    pub fn write_to(&self, w: &mut impl Write, endian: Endian) -> io::Result<()> {
        w.write_all(&self.to_bytes(endian))
    }

    /// One line per entry: address, phase, owner and word.
    pub fn write_listing(&self, w: &mut impl Write) -> io::Result<()> {
        let digits = (self.variant.instr_width() as usize + 3) / 4;
        for (addr, ui, owner) in self.iter() {
            let who = match owner {
                Owner::Trap => String::from("-"),
                Owner::Rule(name) => String::from(name),
                Owner::Reserved(name) => format!("({})", name),
            };
            writeln!(
                w,
                "{:0width$x}  {}  {:08x}  {}",
                addr.instr(),
                addr.phase(),
                ui,
                who,
                width = digits
            )?;
        }
        Ok(())
    }
}

pub struct Builder {
    drom: Drom,
}

impl Builder {
    /// Every entry starts out as the trap word.
    fn new(variant: Variant) -> Self {
        let len = variant.drom_len();
        Builder {
            drom: Drom {
                variant,
                data: vec![defs::uops::trap_word(); len],
                owners: vec![Owner::Trap; len],
            },
        }
    }

    fn build(self) -> Drom {
        info!("{} decode ROM: {}", self.drom.variant, self.drom.summary());
        self.drom
    }

    pub(super) fn decode<S: Slot>(&mut self, table: &Table<S>) {
        let mut hits = 0;
        for slot in table.slots.iter() {
            let rule = match table.decode(slot) {
                Some(rule) => rule,
                None => continue,
            };

            let addr = slot.addr();
            assert_eq!(addr.variant(), self.drom.variant);

            match &rule.action {
                Action::Emit(emit) => {
                    for (phase, ui) in emit(slot).words() {
                        self.claim(addr.with_phase(phase), Owner::Rule(rule.name), ui);
                    }
                }
                Action::Reserved => {
                    debug!("{:#x}: reserved ({})", usize::from(addr), rule.name);
                    self.mark(addr, Owner::Reserved(rule.name));
                }
            }
            hits += 1;
        }
        debug!(
            "{}: {} of {} patterns decoded",
            table.name,
            hits,
            table.slots.len()
        );
    }

    fn mark(&mut self, addr: DAddr, owner: Owner) {
        let loc = usize::from(addr);
        assert!(
            self.drom.owners[loc] == Owner::Trap,
            "{:#x} claimed by both {:?} and {:?}",
            loc,
            self.drom.owners[loc],
            owner
        );
        self.drom.owners[loc] = owner;
    }

    fn claim(&mut self, addr: DAddr, owner: Owner, ui: UInst) {
        self.mark(addr, owner);
        self.drom.data[usize::from(addr)] = ui;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::types::hw::Phase;

    #[test]
    fn listing_has_one_line_per_entry() {
        let drom = Drom::generate(Variant::Mini);
        let mut out = Vec::new();
        drom.write_listing(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), drom.len());

        let first = text.lines().next().unwrap();
        assert!(first.starts_with("00  0  "), "{}", first);
    }

    #[test]
    fn summary_adds_up() {
        let drom = Drom::generate(Variant::Full);
        let summary = drom.summary();
        assert_eq!(summary.len, 4096);
        assert_eq!(summary.claimed + summary.trap, summary.len);
        assert_eq!(summary.reserved, 6);
    }

    #[test]
    fn second_phase_has_the_first_phase_owner() {
        let drom = Drom::generate(Variant::Full);
        let mut seen = 0;
        for (addr, _, owner) in drom.iter().filter(|(a, _, _)| a.phase() == Phase::Second) {
            if let Some(name) = owner.rule() {
                assert_eq!(drom.owner(addr.with_phase(Phase::First)).rule(), Some(name));
                seen += 1;
            }
        }
        assert!(seen > 0);
    }
}
