//! Configuration Container
//!
//! [`Config`] owns one value of a user data type and the marshalers bound to it. It fills
//! defaults (from a user provider or the type's [`DefaultTable`](crate::defaults::DefaultTable)),
//! keeps bound marshalers de-duplicated and ordered by priority, and saves/loads the value
//! through them.
//!
//! Loads are staged: every marshaler decodes into a copy of the current value and the copy is
//! committed only when all of them succeed. Saves are not transactional; a failure part way
//! through leaves earlier files written.
//!
//! A `Config` is a plain owned value. Mutating operations take `&mut self`; callers sharing an
//! instance across threads supply their own locking.

use crate::defaults::Settings;
use crate::error::{BoxError, ConfigError};
use crate::marshaler::{Env, Marshaler};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, trace};

mod binding;
mod preset;

/// User-supplied replacement for table-based defaulting
pub type DefaultsProvider<T> = Box<dyn Fn() -> Result<T, BoxError> + Send + Sync>;

/// Typed configuration container
pub struct Config<T> {
    data: T,
    defaults_provider: Option<DefaultsProvider<T>>,
    // Sorted by ascending priority, unique identities.
    marshalers: Vec<Box<dyn Marshaler<T>>>,
}

impl<T> Config<T> {
    /// Create a container around `data`.
    pub fn new(data: T) -> Self {
        Self {
            data,
            defaults_provider: None,
            marshalers: Vec::new(),
        }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    pub fn into_inner(self) -> T {
        self.data
    }

    /// Install a provider that replaces table-based defaulting.
    pub fn set_defaults_provider<F>(&mut self, provider: F) -> &mut Self
    where
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.defaults_provider = Some(Box::new(provider));
        self
    }

    /// Builder form of [`set_defaults_provider`](Self::set_defaults_provider).
    pub fn with_defaults_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.set_defaults_provider(provider);
        self
    }

    pub fn has_defaults_provider(&self) -> bool {
        self.defaults_provider.is_some()
    }

    /// Bind a batch of marshalers.
    ///
    /// Fails without binding anything if any incoming identity is already bound or repeats
    /// within the batch. Accepted marshalers are placed after every bound marshaler of equal
    /// or lower priority.
    pub fn bind_marshaler<I>(&mut self, marshalers: I) -> Result<&mut Self, ConfigError>
    where
        I: IntoIterator<Item = Box<dyn Marshaler<T>>>,
    {
        binding::merge_marshalers(&mut self.marshalers, marshalers.into_iter().collect())?;
        Ok(self)
    }

    /// Bind a single marshaler.
    pub fn bind<M>(&mut self, marshaler: M) -> Result<&mut Self, ConfigError>
    where
        M: Marshaler<T> + 'static,
    {
        let boxed: Box<dyn Marshaler<T>> = Box::new(marshaler);
        self.bind_marshaler([boxed])
    }

    /// Identities of the bound marshalers in run order
    pub fn marshaler_identities(&self) -> Vec<String> {
        self.marshalers.iter().map(|m| m.identity()).collect()
    }

    pub fn marshaler_count(&self) -> usize {
        self.marshalers.len()
    }

    /// Write the value through every file-backed marshaler, in priority order.
    ///
    /// In-memory marshalers are skipped. Each file is truncated and rewritten, created with
    /// mode `0o644` on unix.
    pub fn save(&self) -> Result<(), ConfigError> {
        if self.marshalers.is_empty() {
            return Err(ConfigError::NoMarshalersBound);
        }

        for marshaler in &self.marshalers {
            let Some(path) = marshaler.location() else {
                trace!(identity = %marshaler.identity(), "Skipping in-memory marshaler");
                continue;
            };

            let bytes = marshaler
                .marshal(&self.data)
                .map_err(|source| ConfigError::EncodeFailed {
                    identity: marshaler.identity(),
                    source,
                })?;

            write_file(path, &bytes).map_err(|source| ConfigError::WriteFailed {
                identity: marshaler.identity(),
                path: path.to_path_buf(),
                source,
            })?;

            debug!(
                identity = %marshaler.identity(),
                path = %path.display(),
                bytes = bytes.len(),
                "Saved configuration"
            );
        }

        Ok(())
    }
}

impl<T: Clone> Config<T> {
    /// Decode `inputs[i]` through the `i`-th bound marshaler, in priority order.
    ///
    /// The input count must equal the bound marshaler count.
    pub fn load_bytes<B: AsRef<[u8]>>(&mut self, inputs: &[B]) -> Result<&T, ConfigError> {
        if inputs.len() != self.marshalers.len() {
            return Err(ConfigError::MismatchedInputCount {
                marshalers: self.marshalers.len(),
                inputs: inputs.len(),
            });
        }

        let mut staged = self.data.clone();
        for (marshaler, input) in self.marshalers.iter().zip(inputs) {
            marshaler
                .unmarshal(input.as_ref(), &mut staged)
                .map_err(|source| ConfigError::DecodeFailed {
                    identity: marshaler.identity(),
                    source,
                })?;
        }

        self.data = staged;
        debug!(marshalers = self.marshalers.len(), "Loaded configuration from bytes");
        Ok(&self.data)
    }

    /// Read and decode the file behind every file-backed marshaler, in priority order.
    ///
    /// In-memory marshalers are skipped. The last marshaler to decode wins.
    pub fn load_path(&mut self) -> Result<&T, ConfigError> {
        if self.marshalers.is_empty() {
            return Err(ConfigError::NoMarshalersBound);
        }

        let mut staged = self.data.clone();
        for marshaler in &self.marshalers {
            let Some(path) = marshaler.location() else {
                trace!(identity = %marshaler.identity(), "Skipping in-memory marshaler");
                continue;
            };

            let bytes = read_file(&**marshaler, path)?;
            marshaler
                .unmarshal(&bytes, &mut staged)
                .map_err(|source| ConfigError::DecodeFailed {
                    identity: marshaler.identity(),
                    source,
                })?;

            debug!(
                identity = %marshaler.identity(),
                path = %path.display(),
                "Loaded configuration"
            );
        }

        self.data = staged;
        Ok(&self.data)
    }
}

impl<T: Settings> Config<T> {
    /// Fill defaults.
    ///
    /// With a provider installed its value replaces the data wholesale. Otherwise the type's
    /// default table fills zero-valued fields only. On failure the data is left untouched.
    pub fn defaults(&mut self) -> Result<&mut Self, ConfigError> {
        if let Some(provider) = &self.defaults_provider {
            self.data = provider().map_err(ConfigError::DefaultsProvider)?;
            debug!("Applied defaults from provider");
        } else {
            let table = T::default_table();
            table.apply(&mut self.data)?;
            debug!(fields = table.len(), "Applied table defaults");
        }
        Ok(self)
    }
}

impl<T: Settings + Clone> Config<T> {
    /// Overlay the process environment through `env`.
    pub fn load_env(&mut self, env: &Env) -> Result<&T, ConfigError> {
        let mut staged = self.data.clone();
        env.overlay_process(&mut staged)
            .map_err(|source| ConfigError::DecodeFailed {
                identity: Marshaler::<T>::identity(env),
                source,
            })?;
        self.data = staged;
        Ok(&self.data)
    }
}

impl<T: PartialEq> Config<T> {
    /// Deep equality of the held values; bound marshalers are ignored.
    pub fn equal(&self, other: &Config<T>) -> bool {
        self.data == other.data
    }
}

impl<T: PartialEq> PartialEq for Config<T> {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl<T: fmt::Debug> fmt::Debug for Config<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data", &self.data)
            .field("defaults_provider", &self.defaults_provider.is_some())
            .field("marshalers", &self.marshaler_identities())
            .finish()
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.flush()
}

fn read_file<T>(marshaler: &dyn Marshaler<T>, path: &Path) -> Result<Vec<u8>, ConfigError> {
    let mut file = File::open(path).map_err(|source| ConfigError::OpenFailed {
        identity: marshaler.identity(),
        path: path.to_path_buf(),
        source,
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|source| ConfigError::ReadFailed {
            identity: marshaler.identity(),
            path: path.to_path_buf(),
            source,
        })?;
    Ok(bytes)
}
