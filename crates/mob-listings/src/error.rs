use mob_store::StoreError;

/// How a persistence failure should be presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Storage is full. The user has to store less (fewer or smaller photos).
    Capacity,
    /// Any other storage failure.
    Storage,
}

impl FailureKind {
    pub fn classify(err: &StoreError) -> Self {
        if err.is_capacity() {
            Self::Capacity
        } else {
            Self::Storage
        }
    }
}

/// Errors from property store and catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    /// Writing the listing collection failed. The in-memory collection was
    /// left as it was before the operation.
    #[error("failed to persist listings ({kind:?}): {source}")]
    Persist {
        kind: FailureKind,
        #[source]
        source: StoreError,
    },

    /// Catalog data could not be parsed.
    #[error("invalid catalog data: {0}")]
    Catalog(String),
}

impl ListingError {
    pub(crate) fn persist(source: StoreError) -> Self {
        Self::Persist {
            kind: FailureKind::classify(&source),
            source,
        }
    }

    /// The failure class, for persistence errors.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Persist { kind, .. } => Some(*kind),
            Self::Catalog(_) => None,
        }
    }

    /// Returns `true` if storage ran out of space.
    pub fn is_capacity(&self) -> bool {
        self.kind() == Some(FailureKind::Capacity)
    }

    /// Text suitable for an alert shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Persist {
                kind: FailureKind::Capacity,
                ..
            } => {
                "There is not enough local storage space to save this listing with so many images. \
                 Try uploading fewer or smaller photos."
            }
            Self::Persist { .. } => {
                "Something went wrong while saving the listing. Please try again."
            }
            Self::Catalog(_) => "The listing catalog could not be loaded.",
        }
    }
}

/// Result alias for listing operations.
pub type ListingResult<T> = Result<T, ListingError>;
