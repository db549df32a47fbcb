//! Reads an instance from a directory of header-less CSV files.
//!
//! ```text
//! vms.csv    name, available_gpus, cost
//! jobs.csv   name, deadline, penalty, tardiness_weight
//! times.csv  job, vm, gpus, time
//! ```
//!
//! Lines starting with `#` are skipped. Only syntax is checked here, the values
//! themselves are checked by [`InstanceData::validate`].

use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::constants::{JOBS_FILE, TIMES_FILE, VMS_FILE};
use crate::errors::LoadError;
use crate::InstanceData;

/// Reads `vms.csv`, `jobs.csv` and `times.csv` from `dir`.
pub fn read_instance_dir(dir: impl AsRef<Path>) -> Result<InstanceData, LoadError> {
    let dir = dir.as_ref();
    let mut data = InstanceData::new();

    for_each_record(&dir.join(VMS_FILE), 3, |row| {
        let name = row.text(0);
        let available_gpus = row.parse("available_gpus", 1)?;
        let cost = row.parse("cost", 2)?;
        data.add_vm(name, available_gpus, cost);
        Ok(())
    })?;

    for_each_record(&dir.join(JOBS_FILE), 4, |row| {
        let name = row.text(0);
        let deadline = row.parse("deadline", 1)?;
        let penalty = row.parse("penalty", 2)?;
        let tardiness_weight = row.parse("tardiness_weight", 3)?;
        data.add_job(name, deadline, penalty, tardiness_weight);
        Ok(())
    })?;

    for_each_record(&dir.join(TIMES_FILE), 4, |row| {
        let job = row.text(0);
        let vm = row.text(1);
        let gpus = row.parse("gpus", 2)?;
        let time = row.parse("time", 3)?;
        data.set_time(job, vm, gpus, time);
        Ok(())
    })?;

    Ok(data)
}

/// A record together with where it came from, for error messages.
struct Located<'a> {
    path: &'a Path,
    line: u64,
    record: &'a StringRecord,
}

impl Located<'_> {
    fn text(&self, i: usize) -> String {
        self.record[i].to_string()
    }

    fn parse<T: FromStr>(&self, field: &'static str, i: usize) -> Result<T, LoadError> {
        self.record[i].parse().map_err(|_| LoadError::Parse {
            path: self.path.to_path_buf(),
            line: self.line,
            field,
            value: self.record[i].to_string(),
        })
    }
}

fn for_each_record<F>(path: &Path, fields: usize, mut f: F) -> Result<(), LoadError>
where
    F: FnMut(&Located) -> Result<(), LoadError>,
{
    let csv_error = |source| LoadError::Csv {
        path: PathBuf::from(path),
        source,
    };

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(csv_error)?;

    let mut count = 0;
    for result in rdr.records() {
        let record = result.map_err(csv_error)?;
        let line = record.position().map_or(0, |pos| pos.line());

        if record.len() != fields {
            return Err(LoadError::FieldCount {
                path: path.to_path_buf(),
                line,
                expected: fields,
                found: record.len(),
            });
        }

        f(&Located {
            path,
            line,
            record: &record,
        })?;
        count += 1;
    }

    debug!(path = %path.display(), records = count, "read instance file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_instance(dir: &Path, vms: &str, jobs: &str, times: &str) {
        fs::write(dir.join(VMS_FILE), vms).expect("Unable to write vms file");
        fs::write(dir.join(JOBS_FILE), jobs).expect("Unable to write jobs file");
        fs::write(dir.join(TIMES_FILE), times).expect("Unable to write times file");
    }

    #[test]
    fn test_read_instance_dir_valid() {
        let dir = tempfile::tempdir().unwrap();
        write_instance(
            dir.path(),
            "# name, gpus, cost\n\
             g4dn, 2, 1.5\n",
            "resnet, 10, 100, 5\n",
            "resnet, g4dn, 1, 5\n\
             resnet, g4dn, 2, 3.5\n",
        );

        let instance = read_instance_dir(dir.path())
            .expect("Failed to read instance")
            .validate()
            .expect("Instance should be valid");

        assert_eq!(instance.vms().len(), 1);
        assert_eq!(instance.vm(0).name(), "g4dn");
        assert_eq!(instance.vm(0).available_gpus(), 2);
        assert_eq!(instance.vm(0).cost(), 1.5);
        assert_eq!(instance.job(0).name(), "resnet");
        assert_eq!(instance.job(0).tardiness_weight(), 5.0);
        assert_eq!(instance.time(0, 1), 3.5);
    }

    #[test]
    fn test_read_instance_dir_bad_number() {
        let dir = tempfile::tempdir().unwrap();
        write_instance(dir.path(), "g4dn, two, 1.5\n", "", "");

        match read_instance_dir(dir.path()) {
            Err(LoadError::Parse { field, line, value, .. }) => {
                assert_eq!(field, "available_gpus");
                assert_eq!(line, 1);
                assert_eq!(value, "two");
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_read_instance_dir_wrong_field_count() {
        let dir = tempfile::tempdir().unwrap();
        write_instance(dir.path(), "g4dn, 2, 1.5\n", "resnet, 10\n", "");

        assert!(matches!(
            read_instance_dir(dir.path()),
            Err(LoadError::FieldCount { expected: 4, found: 2, .. })
        ));
    }

    #[test]
    fn test_read_instance_dir_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            read_instance_dir(dir.path()),
            Err(LoadError::Csv { .. })
        ));
    }
}
