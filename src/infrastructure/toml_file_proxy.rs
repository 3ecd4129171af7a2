use std::{fmt::Display, io::SeekFrom};

use tokio::{
    fs::{File, OpenOptions},
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};

/// A TOML file together with its parsed contents.
///
/// The file is created empty when missing, so `T` must accept an empty document.
pub struct TomlFileProxy<T> {
    file: File,
    cache: Option<T>,
}

impl<T> TomlFileProxy<T>
where
    T: serde::de::DeserializeOwned + serde::Serialize,
{
    pub async fn new(path: &str) -> Result<Self, Error> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)
            .await?;

        Ok(Self { file, cache: None })
    }

    /// Load data from the file to cache, and returns the cached data
    pub async fn load(&mut self) -> Result<&T, Error> {
        let mut toml = String::new();
        self.file.seek(SeekFrom::Start(0)).await?;
        self.file.read_to_string(&mut toml).await?;

        let data = toml::from_str::<T>(&toml)?;
        Ok(&*self.cache.insert(data))
    }

    /// Save the cached data to the file
    pub async fn save(&mut self) -> Result<(), Error> {
        let Self { file, cache } = self;
        let cache = match cache {
            Some(c) => c,
            None => return Err(Error::CacheEmpty),
        };

        let toml = toml::to_string_pretty(cache)?;

        file.seek(SeekFrom::Start(0)).await?;
        file.set_len(0).await?;
        file.write_all(toml.as_bytes()).await?;

        file.flush().await?;

        Ok(())
    }

    pub fn cache(&self) -> Result<&T, Error> {
        self.cache.as_ref().ok_or(Error::CacheEmpty)
    }

    pub fn cache_mut(&mut self) -> Result<&mut T, Error> {
        self.cache.as_mut().ok_or(Error::CacheEmpty)
    }
}

#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    TomlError(toml::de::Error),
    TomlSerError(toml::ser::Error),
    CacheEmpty,
}
impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::IoError(e) => f.write_fmt(format_args!("IO error: {e}")),
            Error::TomlError(e) => f.write_fmt(format_args!("Toml error: {e}")),
            Error::TomlSerError(e) => f.write_fmt(format_args!("Toml error: {e}")),
            Error::CacheEmpty => f.write_fmt(format_args!("Cache is empty.")),
        }
    }
}
impl std::error::Error for Error {}
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e)
    }
}
impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::TomlError(e)
    }
}
impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::TomlSerError(e)
    }
}
