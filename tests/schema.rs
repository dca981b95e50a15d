use enum_map::EnumMap;
use sedicipu2::spec::types::schema::{self, CtlWord, Field};

#[test]
fn every_field_round_trips_every_value() {
    for &f in Field::ALL.iter() {
        let def = f.def();
        for v in 0..=def.max() {
            let raw = f.encode(v);
            assert_eq!(raw & !def.mask(), 0, "{} = {}", f.name(), v);
            assert_eq!(f.extract(raw), v, "{} = {}", f.name(), v);
            assert_eq!(CtlWord::new().with(f, v).pack(), raw);
        }
    }
}

#[test]
fn fields_do_not_bleed_into_each_other() {
    let mut vals: EnumMap<Field, u32> = EnumMap::new();
    for (i, &f) in Field::ALL.iter().enumerate() {
        vals[f] = (i as u32 * 5 + 3) & f.def().max();
    }
    assert_eq!(schema::unpack(schema::pack(&vals)), vals);
}

#[test]
fn all_ones_fills_the_word() {
    let mut vals: EnumMap<Field, u32> = EnumMap::new();
    for &f in Field::ALL.iter() {
        vals[f] = f.def().max();
    }
    assert_eq!(schema::pack(&vals), u32::MAX);
}
