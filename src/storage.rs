use anyhow::{anyhow, Context, Result};
use calgrid::CalendarConfig;
use chrono::{Datelike, NaiveDate};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const PROJECT_DIR: &str = ".calgrid";
const FILE_NAME: &str = "calendar.yml";

/// What gets written to disk: the layout plus the dates picked so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarFile {
    pub name: String,
    pub config: CalendarConfig,
    #[serde(default)]
    pub selected: Vec<NaiveDate>,
}

impl CalendarFile {
    pub fn new(name: impl Into<String>, config: CalendarConfig) -> Self {
        CalendarFile {
            name: name.into(),
            config,
            selected: Vec::new(),
        }
    }

    /// Whole calendar year containing `today`.
    pub fn for_year_of(name: impl Into<String>, today: NaiveDate) -> Result<Self> {
        let year = today.year();
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| anyhow!("no January 1st in year {year}"))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| anyhow!("no December 31st in year {year}"))?;
        Ok(CalendarFile::new(name, CalendarConfig::new(start, end)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarScope {
    Project,
    Global,
}

impl CalendarScope {
    pub fn label(&self) -> &'static str {
        match self {
            CalendarScope::Project => "project",
            CalendarScope::Global => "global",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CalendarLocation {
    pub path: PathBuf,
    pub scope: CalendarScope,
}

/// Writes `.calgrid/calendar.yml` under `dir` unless one is already there.
pub fn init_project_calendar(dir: &Path, file: &CalendarFile) -> Result<(CalendarLocation, bool)> {
    let project_dir = dir.join(PROJECT_DIR);
    fs::create_dir_all(&project_dir).context("failed to create .calgrid directory")?;
    let location = CalendarLocation {
        path: project_dir.join(FILE_NAME),
        scope: CalendarScope::Project,
    };
    if location.path.exists() {
        return Ok((location, false));
    }
    save_calendar(&location, file)?;
    Ok((location, true))
}

pub fn locate_calendar(start: &Path) -> Result<CalendarLocation> {
    if let Some(project_path) = find_project_calendar(start) {
        return Ok(CalendarLocation {
            path: project_path,
            scope: CalendarScope::Project,
        });
    }
    Ok(CalendarLocation {
        path: data_dir()?.join(FILE_NAME),
        scope: CalendarScope::Global,
    })
}

/// Reads the calendar at `location`, creating a default one for the year of
/// `today` when the file does not exist yet.
pub fn load_calendar(location: &CalendarLocation, today: NaiveDate) -> Result<CalendarFile> {
    if location.path.exists() {
        let data = fs::read_to_string(&location.path)
            .with_context(|| format!("reading {:?}", location.path))?;
        let file: CalendarFile = serde_yaml::from_str(&data).context("parsing calendar file")?;
        return Ok(file);
    }
    let fallback_name = match location.scope {
        CalendarScope::Project => location
            .path
            .parent()
            .and_then(|p| p.parent())
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("project")
            .to_string(),
        CalendarScope::Global => "default".to_string(),
    };
    let file = CalendarFile::for_year_of(fallback_name, today)?;
    save_calendar(location, &file)?;
    Ok(file)
}

pub fn save_calendar(location: &CalendarLocation, file: &CalendarFile) -> Result<()> {
    if let Some(parent) = location.path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let serialized = serde_yaml::to_string(file).context("serializing calendar")?;
    fs::write(&location.path, serialized)
        .with_context(|| format!("writing {:?}", location.path))?;
    Ok(())
}

/// Per-user data directory; holds the global calendar and the logs.
pub fn data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "calgrid").context("locating data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

fn find_project_calendar(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(PROJECT_DIR).join(FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use calgrid::SegmentationPolicy;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn project_calendar_is_found_from_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let file = CalendarFile::for_year_of("work", date(2024, 5, 5)).unwrap();
        let (created, fresh) = init_project_calendar(tmp.path(), &file).unwrap();
        assert!(fresh);

        let nested = tmp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        let found = locate_calendar(&nested).unwrap();
        assert_eq!(found.scope, CalendarScope::Project);
        assert_eq!(found.path, created.path);
    }

    #[test]
    fn init_keeps_an_existing_calendar() {
        let tmp = tempfile::tempdir().unwrap();
        let mut file = CalendarFile::for_year_of("first", date(2024, 1, 1)).unwrap();
        file.selected.push(date(2024, 3, 3));
        init_project_calendar(tmp.path(), &file).unwrap();

        let other = CalendarFile::for_year_of("second", date(2025, 1, 1)).unwrap();
        let (location, fresh) = init_project_calendar(tmp.path(), &other).unwrap();
        assert!(!fresh);
        let loaded = load_calendar(&location, date(2025, 1, 1)).unwrap();
        assert_eq!(loaded.name, "first");
        assert_eq!(loaded.selected, vec![date(2024, 3, 3)]);
    }

    #[test]
    fn save_and_load_keep_config_and_selection() {
        let tmp = tempfile::tempdir().unwrap();
        let location = CalendarLocation {
            path: tmp.path().join("nested").join(FILE_NAME),
            scope: CalendarScope::Global,
        };
        let mut config = CalendarConfig::new(date(2024, 1, 1), date(2024, 6, 30));
        config.segmentation = SegmentationPolicy::FixedDays(28);
        config.allows_multiple_selection = true;
        let mut file = CalendarFile::new("sprints", config);
        file.selected = vec![date(2024, 2, 1), date(2024, 2, 29)];

        save_calendar(&location, &file).unwrap();
        let loaded = load_calendar(&location, date(2030, 1, 1)).unwrap();
        assert_eq!(loaded.name, "sprints");
        assert_eq!(loaded.config, file.config);
        assert_eq!(loaded.selected, file.selected);
    }

    #[test]
    fn missing_file_gets_a_default_year() {
        let tmp = tempfile::tempdir().unwrap();
        let location = CalendarLocation {
            path: tmp.path().join(PROJECT_DIR).join(FILE_NAME),
            scope: CalendarScope::Project,
        };
        let file = load_calendar(&location, date(2024, 7, 4)).unwrap();
        assert!(location.path.exists());
        assert_eq!(file.config.start, date(2024, 1, 1));
        assert_eq!(file.config.end, date(2024, 12, 31));
        assert!(file.selected.is_empty());
    }
}
