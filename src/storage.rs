use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf}
};
use flate2::{write::GzEncoder, Compression};
use tracing::info;

use crate::{
    error::Result,
    format::Formatter,
    model::{ResultTable, COLUMNS}
};

// Utils to store result tables on local device.
pub struct LocalSaver;

impl LocalSaver {
    /// Path a table with `base_name` is written to.
    pub fn table_path(dir: &Path, base_name: &str) -> PathBuf {
        dir.join(format!("{}.csv.gz", base_name))
    }

    /// Writes `<dir>/<base_name>.csv.gz`, header included even for an empty table.
    /// An existing file is overwritten without confirmation.
    pub fn save_table_as_csv_gz(dir: &Path, base_name: &str, data: &ResultTable) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = Self::table_path(dir, base_name);
        let encoder = GzEncoder::new(File::create(&path)?, Compression::default());
        let mut writer = csv::Writer::from_writer(encoder);

        writer.write_record(COLUMNS)?;
        data.records().iter().try_for_each(|record| -> Result<()> {
            writer.write_record(Formatter::to_row(record)?)?;
            Ok(())
        })?;

        let mut file = writer.into_inner()
            .map_err(|e| e.into_error())?
            .finish()?;
        file.flush()?;
        info!(path = %path.display(), rows = data.len(), "saved result table");
        Ok(path)
    }
}
