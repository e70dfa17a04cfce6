// ============================================================
// Layer 4 - Hugging Face Hub Source
// ============================================================
// Fetches split files for a dataset identifier (for example
// "dair-ai/emotion") and parses them with the local loader.
//
// hf-hub caches downloads under ~/.cache/huggingface/hub, so
// only the first run touches the network. The repository file
// listing is fetched once and used to tell "this split is not
// published" apart from a real download failure. Paths are
// repo-relative, e.g. "split/train-00000-of-00001.parquet".

use anyhow::{Context, Result};
use hf_hub::{
    api::sync::{Api, ApiRepo},
    Repo, RepoType,
};
use std::cell::OnceCell;

use crate::data::loader::{read_split_file, SplitFiles};
use crate::domain::traits::TweetSource;
use crate::domain::tweet::{Split, Tweet};

pub const DEFAULT_DATASET: &str = "dair-ai/emotion";

pub struct HubSource {
    dataset_id: String,
    revision:   String,
    files:      SplitFiles,
    repo:       ApiRepo,
    listing:    OnceCell<Vec<String>>,
}

impl HubSource {
    pub fn new(
        dataset_id: impl Into<String>,
        revision:   impl Into<String>,
        files:      SplitFiles,
    ) -> Result<Self> {
        let dataset_id = dataset_id.into();
        let revision   = revision.into();
        let api = Api::new().context("Failed to initialise the Hugging Face Hub API")?;
        let repo = api.repo(Repo::with_revision(
            dataset_id.clone(),
            RepoType::Dataset,
            revision.clone(),
        ));
        Ok(Self { dataset_id, revision, files, repo, listing: OnceCell::new() })
    }

    fn listing(&self) -> Result<&[String]> {
        if let Some(files) = self.listing.get() {
            return Ok(files);
        }
        let info = self.repo.info().with_context(|| {
            format!("Cannot list files of dataset '{}@{}'", self.dataset_id, self.revision)
        })?;
        let names: Vec<String> = info.siblings.into_iter().map(|s| s.rfilename).collect();
        tracing::debug!("Dataset '{}' has {} files", self.dataset_id, names.len());
        Ok(self.listing.get_or_init(|| names))
    }
}

impl TweetSource for HubSource {
    fn load_split(&self, split: Split) -> Result<Option<Vec<Tweet>>> {
        let file = self.files.for_split(split);
        if !self.listing()?.iter().any(|f| f == file) {
            tracing::warn!("Dataset '{}' has no file '{}' for the {} split", self.dataset_id, file, split);
            return Ok(None);
        }

        tracing::info!("Fetching '{}' from '{}'", file, self.dataset_id);
        let path = self
            .repo
            .get(file)
            .with_context(|| format!("Failed to download '{}' from '{}'", file, self.dataset_id))?;
        read_split_file(&path).map(Some)
    }

    fn describe(&self) -> String {
        format!("hub dataset '{}@{}'", self.dataset_id, self.revision)
    }
}
