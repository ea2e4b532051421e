use std::collections::BTreeMap;
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AtlasFile {
    frames: BTreeMap<String, FrameEntry>,
}

#[derive(Copy, Clone, Debug, Deserialize)]
struct FrameEntry {
    x: u16,
    y: u16,
    width: u16,
    height: u16,
}

/// Bakes the atlas metadata into a static lookup table so tile resolution
/// never touches the filesystem at runtime.
fn main() {
    let out = Path::new(&env::var("OUT_DIR").unwrap()).join("atlas_data.rs");
    let mut file = BufWriter::new(File::create(&out).unwrap());

    let atlas: AtlasFile = serde_json::from_str(include_str!("./assets/game/atlas.json")).unwrap();
    assert!(!atlas.frames.is_empty(), "atlas.json contains no frames");

    writeln!(&mut file, "use phf::phf_map;").unwrap();
    writeln!(&mut file, "use crate::texture::sprite::MapperFrame;").unwrap();
    writeln!(
        &mut file,
        "pub static ATLAS_FRAMES: phf::Map<&'static str, MapperFrame> = phf_map! {{"
    )
    .unwrap();

    // BTreeMap keeps the generated table in name order, so the output is
    // stable across builds.
    for (name, frame) in &atlas.frames {
        writeln!(
            &mut file,
            "    {name:?} => MapperFrame {{ x: {}, y: {}, width: {}, height: {} }},",
            frame.x, frame.y, frame.width, frame.height
        )
        .unwrap();
    }

    writeln!(&mut file, "}};").unwrap();
    println!("cargo:rerun-if-changed=assets/game/atlas.json");
}
