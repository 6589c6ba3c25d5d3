//! Record generation
//!
//! Asks for the session defaults, stores them in `config.session`, then
//! writes one publish record per raster dataset found in the process
//! directory. Derived names are recomputed on every run; editable values
//! come from the user (interactive mode) or from the tiers.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::{
    edit_with_current, session_path, ConfigKey, ConfigResolver, ConfigTier, FlatFileError,
    KeyValues, TierKind,
};
use crate::discovery::{discover_datasets, DatasetFile, DiscoveryError, NameRules, DEFAULT_FILE_FILTER};
use crate::prompt::{PromptError, Prompter};
use crate::record::{record_path, PublishRecord, RecordError};

/// Generate errors
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] FlatFileError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("no workspace given (use --workspace or set {0})")]
    MissingWorkspace(&'static str),
}

/// Options for one generate run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub process_dir: PathBuf,
    pub file_filter: String,
    pub names: NameRules,
    /// Workspace from the command line; wins over the tiers
    pub workspace: Option<String>,
    /// Prompt for every record
    pub interactive: bool,
    /// Echo instead of writing
    pub debug: bool,
}

impl GenerateOptions {
    pub fn new(process_dir: impl Into<PathBuf>) -> Self {
        Self {
            process_dir: process_dir.into(),
            file_filter: DEFAULT_FILE_FILTER.to_string(),
            names: NameRules::default(),
            workspace: None,
            interactive: false,
            debug: false,
        }
    }
}

/// Values stored in the session tier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionDefaults {
    pub store_description: String,
    pub coverage_description: String,
    pub coverage_abstract: String,
    /// Comma separated, without spaces
    pub coverage_keywords: String,
    pub host: String,
    pub instance: String,
    pub user: String,
    pub coverage_root_dir: String,
}

impl SessionDefaults {
    /// Session file content, in session key order
    pub fn to_values(&self) -> KeyValues {
        ConfigKey::SESSION_KEYS
            .iter()
            .map(|key| (key.as_str(), self.value(*key)))
            .collect()
    }

    fn value(&self, key: ConfigKey) -> &str {
        match key {
            ConfigKey::StoreDescription => &self.store_description,
            ConfigKey::CoverageDescription => &self.coverage_description,
            ConfigKey::CoverageAbstract => &self.coverage_abstract,
            ConfigKey::CoverageKeywords => &self.coverage_keywords,
            ConfigKey::CatalogHost => &self.host,
            ConfigKey::CatalogInstance => &self.instance,
            ConfigKey::CatalogUser => &self.user,
            ConfigKey::CoverageRootDir => &self.coverage_root_dir,
            _ => "",
        }
    }
}

/// Editable record values, before they are written
#[derive(Debug, Clone, Default)]
struct RecordFields {
    store_description: String,
    title: String,
    description: String,
    abstract_text: String,
    keywords: String,
    style: String,
}

/// Generates publish records for one process directory
pub struct Generator<'p> {
    options: GenerateOptions,
    resolver: ConfigResolver,
    prompter: &'p mut dyn Prompter,
}

impl<'p> Generator<'p> {
    pub fn new(
        options: GenerateOptions,
        resolver: ConfigResolver,
        prompter: &'p mut dyn Prompter,
    ) -> Self {
        Self {
            options,
            resolver,
            prompter,
        }
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// Session defaults, then one record per dataset
    pub fn run(&mut self) -> Result<Vec<PublishRecord>, GenerateError> {
        let defaults = self.prompt_session_defaults()?;
        self.write_session_defaults(&defaults)?;
        self.generate_records()
    }

    /// Ask for the values shared by every record of this directory
    ///
    /// An unset coverage description starts out as the abstract just entered.
    pub fn prompt_session_defaults(&mut self) -> Result<SessionDefaults, GenerateError> {
        info!("Enter session defaults; hit <enter> to keep a value, start with '+' to append");
        let prompter: &mut dyn Prompter = &mut *self.prompter;
        let resolver = &self.resolver;

        let store_description =
            resolver.edit_value(prompter, "CoverageStore description", ConfigKey::StoreDescription)?;
        let coverage_abstract =
            resolver.edit_value(prompter, "Coverage abstract (displayed)", ConfigKey::CoverageAbstract)?;
        let coverage_description = resolver.edit_value_or(
            prompter,
            "Coverage description (hidden)",
            ConfigKey::CoverageDescription,
            &coverage_abstract,
        )?;
        let coverage_keywords = resolver
            .edit_value(prompter, "Coverage keywords (, separated)", ConfigKey::CoverageKeywords)?
            .replace(' ', "");
        let host = resolver.edit_value(prompter, "Catalog host", ConfigKey::CatalogHost)?;
        let instance = resolver.edit_value(prompter, "Catalog instance", ConfigKey::CatalogInstance)?;
        let user = resolver.edit_value(prompter, "Catalog admin user", ConfigKey::CatalogUser)?;
        let coverage_root_dir = resolver.edit_value(
            prompter,
            "Coverage root dir (empty, or with trailing slash)",
            ConfigKey::CoverageRootDir,
        )?;

        Ok(SessionDefaults {
            store_description,
            coverage_description,
            coverage_abstract,
            coverage_keywords,
            host,
            instance,
            user,
            coverage_root_dir,
        })
    }

    /// Store the session defaults and make them the session tier
    ///
    /// In debug mode nothing is written; the values still feed this run.
    pub fn write_session_defaults(&mut self, defaults: &SessionDefaults) -> Result<(), GenerateError> {
        let path = session_path(&self.options.process_dir);
        let mut session = ConfigTier::from_values(TierKind::Session, defaults.to_values());
        if self.options.debug {
            info!(
                path = %path.display(),
                "Session defaults (not written):\n{}",
                session.values().serialize()
            );
        } else {
            session.persist_to(&path)?;
            info!(path = %path.display(), "Wrote session defaults");
        }
        self.resolver.set_session(session);
        debug!(
            host = %defaults.host,
            instance = %defaults.instance,
            user = %defaults.user,
            root = %defaults.coverage_root_dir,
            "session settings"
        );
        Ok(())
    }

    /// `--workspace` if given, otherwise the resolved workspace
    pub fn resolve_workspace(&self) -> Result<String, GenerateError> {
        let from_flag = self
            .options
            .workspace
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty());
        match from_flag {
            Some(workspace) => Ok(workspace.to_string()),
            None => {
                let resolved = self.resolver.resolve(ConfigKey::StoreWorkspace);
                let resolved = resolved.trim();
                if resolved.is_empty() {
                    Err(GenerateError::MissingWorkspace(ConfigKey::StoreWorkspace.as_str()))
                } else {
                    Ok(resolved.to_string())
                }
            }
        }
    }

    /// Write one record per dataset
    ///
    /// A record that cannot be built or saved is skipped with a warning;
    /// prompt failures end the run.
    pub fn generate_records(&mut self) -> Result<Vec<PublishRecord>, GenerateError> {
        let workspace = self.resolve_workspace()?;
        let datasets = discover_datasets(&self.options.process_dir, &self.options.file_filter)?;
        info!(
            workspace = %workspace,
            datasets = datasets.len(),
            interactive = self.options.interactive,
            "Generating publish data"
        );

        let mut records = Vec::with_capacity(datasets.len());
        for dataset in &datasets {
            let record = match self.build_record(dataset, &workspace) {
                Ok(record) => record,
                Err(GenerateError::Prompt(e)) => return Err(GenerateError::Prompt(e)),
                Err(e) => {
                    warn!(file = %dataset.file_name, error = %e, "Skipping dataset");
                    continue;
                }
            };

            if self.options.debug {
                info!(path = %record.path().display(), "Publish data (not written):\n{}", record.render());
            } else if let Err(e) = record.save() {
                warn!(path = %record.path().display(), error = %e, "Failed to write publish data");
                continue;
            } else {
                info!(path = %record.path().display(), "Wrote publish data");
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Build the record of one dataset
    ///
    /// The existing record file, if any, becomes the record tier. Keys of the
    /// existing record outside the generated set are kept after the
    /// generated ones.
    pub fn build_record(
        &mut self,
        dataset: &DatasetFile,
        workspace: &str,
    ) -> Result<PublishRecord, GenerateError> {
        let names = self.options.names.derive(&dataset.file_name);
        let path = record_path(&self.options.process_dir, &dataset.file_name);
        info!(
            file = %dataset.file_name,
            datatype = %dataset.datatype,
            clean = %names.clean,
            store = %names.store,
            coverage = %names.coverage,
            record = %path.display(),
            "Processing"
        );

        let existing = PublishRecord::load(&path)?;
        self.resolver.set_record_values(existing.values().clone());
        if self.resolver.resolve(ConfigKey::CoverageTitle).trim().is_empty() {
            self.resolver
                .record_mut()
                .values_mut()
                .insert(ConfigKey::CoverageTitle.as_str(), names.coverage.as_str());
        }

        let fields = if self.options.interactive {
            self.prompt_record_fields()?
        } else {
            self.resolve_record_fields()
        };

        let filename = dataset.path.display().to_string();
        let mut record = PublishRecord::new(path, KeyValues::new());
        for key in ConfigKey::RECORD_KEYS {
            let value: &str = match key {
                ConfigKey::StoreWorkspace => workspace,
                ConfigKey::StoreDatatype => dataset.datatype.as_str(),
                ConfigKey::StoreFilename => &filename,
                ConfigKey::StoreName | ConfigKey::CoverageStoreName => &names.store,
                ConfigKey::StoreDescription => &fields.store_description,
                ConfigKey::CoverageName | ConfigKey::LayerCoverageName => &names.coverage,
                ConfigKey::CoverageTitle => &fields.title,
                ConfigKey::CoverageDescription => &fields.description,
                ConfigKey::CoverageAbstract => &fields.abstract_text,
                ConfigKey::CoverageKeywords => &fields.keywords,
                ConfigKey::LayerStyle => &fields.style,
                _ => continue,
            };
            record.set(key.as_str(), value)?;
        }
        for (key, value) in existing.values().iter() {
            if record.get(key).is_none() {
                record.set(key, value)?;
            }
        }
        Ok(record)
    }

    fn prompt_record_fields(&mut self) -> Result<RecordFields, GenerateError> {
        let prompter: &mut dyn Prompter = &mut *self.prompter;
        let resolver = &self.resolver;

        let store_description =
            resolver.edit_value(prompter, "CoverageStore description", ConfigKey::StoreDescription)?;
        let title = resolver.edit_value(prompter, "Coverage title (displayed)", ConfigKey::CoverageTitle)?;
        let abstract_text =
            resolver.edit_value(prompter, "Coverage abstract (displayed)", ConfigKey::CoverageAbstract)?;
        let current_description = resolver
            .record()
            .get_key(ConfigKey::CoverageDescription)
            .unwrap_or(abstract_text.as_str())
            .to_string();
        let description = edit_with_current(
            prompter,
            "Coverage description (hidden)",
            ConfigKey::CoverageDescription,
            &current_description,
        )?;
        let keywords = resolver
            .edit_value(prompter, "Coverage keywords (, separated)", ConfigKey::CoverageKeywords)?
            .replace(' ', "");
        let style = resolver.edit_value(prompter, "Coverage/layer style (sld)", ConfigKey::LayerStyle)?;

        Ok(RecordFields {
            store_description,
            title,
            description,
            abstract_text,
            keywords,
            style,
        })
    }

    fn resolve_record_fields(&self) -> RecordFields {
        let r = &self.resolver;
        RecordFields {
            store_description: r.resolve(ConfigKey::StoreDescription),
            title: r.resolve(ConfigKey::CoverageTitle),
            description: r.resolve(ConfigKey::CoverageDescription),
            abstract_text: r.resolve(ConfigKey::CoverageAbstract),
            keywords: r.resolve(ConfigKey::CoverageKeywords).replace(' ', ""),
            style: r.resolve(ConfigKey::LayerStyle),
        }
    }
}
