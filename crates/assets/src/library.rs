use arplace_common::AssetReference;

/// The known assets (built-in plus uploads, in upload order) and the single
/// active selection.
#[derive(Debug, Clone)]
pub struct AssetLibrary {
    uploaded: Vec<AssetReference>,
    active: AssetReference,
}

impl Default for AssetLibrary {
    fn default() -> Self {
        Self {
            uploaded: Vec::new(),
            active: AssetReference::cube(),
        }
    }
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &AssetReference {
        &self.active
    }

    /// Change the active pointer. Already-placed entities hold their own copy
    /// and are unaffected.
    pub fn select(&mut self, reference: AssetReference) {
        if reference != AssetReference::cube() && !self.uploaded.contains(&reference) {
            tracing::debug!(
                asset = reference.display_name(),
                "selecting an asset outside the library"
            );
        }
        self.active = reference;
    }

    /// Record an upload and make it active.
    pub fn add(&mut self, reference: AssetReference) {
        self.uploaded.push(reference.clone());
        self.active = reference;
    }

    pub fn uploaded(&self) -> &[AssetReference] {
        &self.uploaded
    }

    /// Built-in cube followed by uploads.
    pub fn known(&self) -> impl Iterator<Item = AssetReference> + '_ {
        std::iter::once(AssetReference::cube()).chain(self.uploaded.iter().cloned())
    }
}
