use std::{
    fmt::Debug,
    io::{BufReader, BufWriter, Write},
    path::PathBuf,
};

use anyhow::Context;
use fs_err::File;
use serde::{Deserialize, Serialize};
use serde_json::{ser::PrettyFormatter, Serializer};

pub fn read_json<P: Into<PathBuf> + Debug, T: for<'de> Deserialize<'de>>(
    path: P,
) -> anyhow::Result<T> {
    let path = path.into();
    (|| serde_json::from_reader(BufReader::new(File::open(&path)?)).map_err(anyhow::Error::new))()
        .with_context(|| {
            format!(
                "While trying to parse {path:?} as {}",
                std::any::type_name::<T>()
            )
        })
}

/// Writes `value` indented by four spaces.
pub fn write_json_pretty<P: Into<PathBuf>, T: Serialize>(path: P, value: &T) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let mut serializer = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    writer.flush()?;
    Ok(())
}
