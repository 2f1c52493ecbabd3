//! JSON 설정 저장소
//!
//! 글로벌(`<config_dir>/custodian/`)과 프로젝트(`.custodian/`) 두 위치를 지원합니다.

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 글로벌 설정 디렉토리 이름
const GLOBAL_DIR: &str = "custodian";

/// 프로젝트 설정 디렉토리 이름
const PROJECT_DIR: &str = ".custodian";

/// JSON 설정 저장소
#[derive(Debug, Clone)]
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// 글로벌 설정 (`<config_dir>/custodian/`)
    pub fn global() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Cannot find config directory".to_string()))?
            .join(GLOBAL_DIR);
        Ok(Self::new(dir))
    }

    /// 프로젝트 설정 (`<root>/.custodian/`)
    pub fn project(root: impl Into<PathBuf>) -> Self {
        Self::new(root.into().join(PROJECT_DIR))
    }

    /// 현재 디렉토리 기준 프로젝트 설정
    pub fn current_project() -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| Error::Config(format!("Cannot get current directory: {}", e)))?;
        Ok(Self::project(cwd))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.base_dir.join(filename)
    }

    /// JSON 로드 (파일이 없으면 에러)
    pub fn load<T: DeserializeOwned>(&self, filename: &str) -> Result<T> {
        self.load_optional(filename)?.ok_or_else(|| {
            Error::Config(format!("{} does not exist", self.file_path(filename).display()))
        })
    }

    /// JSON 로드 (파일이 없으면 None)
    ///
    /// 존재 여부를 따로 확인하지 않고 읽기 결과의 `NotFound`로 판단합니다.
    pub fn load_optional<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        let path = self.file_path(filename);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not present");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| Error::Config(format!("{} is not valid JSON: {}", path.display(), e)))
    }

    /// JSON 저장
    ///
    /// 같은 디렉토리의 임시 파일에 쓴 뒤 rename하므로 읽는 쪽이 반쯤 쓰인 파일을 보지 않습니다.
    pub fn save<T: Serialize>(&self, filename: &str, data: &T) -> Result<()> {
        std::fs::create_dir_all(&self.base_dir)?;

        let path = self.file_path(filename);
        let staging = self.base_dir.join(format!(".{}.tmp", filename));
        let mut content = serde_json::to_vec_pretty(data)?;
        content.push(b'\n');

        std::fs::write(&staging, &content)?;
        if let Err(e) = std::fs::rename(&staging, &path) {
            let _ = std::fs::remove_file(&staging);
            return Err(e.into());
        }

        debug!(path = %path.display(), bytes = content.len(), "Saved JSON file");
        Ok(())
    }

    /// 파일 존재 여부
    pub fn exists(&self, filename: &str) -> bool {
        self.file_path(filename).is_file()
    }

    /// 파일 삭제 (이미 없으면 false)
    pub fn remove(&self, filename: &str) -> Result<bool> {
        match std::fs::remove_file(self.file_path(filename)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        limit: usize,
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nested"));
        let sample = Sample {
            name: "pool".into(),
            limit: 8,
        };

        store.save("sample.json", &sample).unwrap();
        assert!(store.exists("sample.json"));

        let loaded: Sample = store.load("sample.json").unwrap();
        assert_eq!(loaded, sample);
    }

    #[test]
    fn test_load_optional_missing() {
        let dir = tempdir().unwrap();
        let store = JsonStore::project(dir.path());

        let loaded: Option<Sample> = store.load_optional("missing.json").unwrap();
        assert!(loaded.is_none());
        assert!(store.base_dir().ends_with(".custodian"));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        let store = JsonStore::new(dir.path());

        let err = store.load::<Sample>("bad.json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_remove() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        store.save("gone.json", &1u32).unwrap();

        assert!(store.remove("gone.json").unwrap());
        assert!(!store.exists("gone.json"));
        // 두 번째 삭제는 no-op
        assert!(!store.remove("gone.json").unwrap());
    }

    #[test]
    fn test_load_missing_is_config_error() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path());

        let err = store.load::<Sample>("missing.json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_save_leaves_no_staging_file() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        store.save("a.json", &Sample { name: "a".into(), limit: 1 }).unwrap();
        store.save("a.json", &Sample { name: "b".into(), limit: 2 }).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["a.json".to_string()]);
        assert_eq!(store.load::<Sample>("a.json").unwrap().limit, 2);
    }
}
