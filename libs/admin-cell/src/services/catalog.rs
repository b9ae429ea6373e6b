use std::path::{Path, PathBuf};

use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info, instrument, warn};

use shared_config::AppConfig;

use crate::models::{
    CatalogError, CatalogSummary, ClinicRecords, DoctorInput, DoctorRecord, PromotionInput, PromotionRecord,
};

/// In-memory copy of the clinic's record lists.
///
/// Promotions and doctors can be edited in place. Edits are never written
/// back to the source file, and `reload` replaces them with the file's
/// contents.
#[derive(Debug)]
pub struct CatalogService {
    source: Option<PathBuf>,
    records: RwLock<ClinicRecords>,
}

impl CatalogService {
    pub fn new(records: ClinicRecords) -> Self {
        Self {
            source: None,
            records: RwLock::new(records),
        }
    }

    pub async fn from_path(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let path = path.into();
        let records = load_records(&path).await?;
        info!("Loaded clinic catalog from {}: {:?}", path.display(), records.summary());

        Ok(Self {
            source: Some(path),
            records: RwLock::new(records),
        })
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        match &config.clinic_data_path {
            Some(path) => Self::from_path(path.clone()).await,
            None => {
                warn!("No clinic data path configured, starting with an empty catalog");
                Ok(Self::new(ClinicRecords::default()))
            }
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub async fn records(&self) -> RwLockReadGuard<'_, ClinicRecords> {
        self.records.read().await
    }

    pub async fn summary(&self) -> CatalogSummary {
        self.records.read().await.summary()
    }

    /// Re-read the source file. The current lists are kept if that fails.
    #[instrument(skip(self))]
    pub async fn reload(&self) -> Result<CatalogSummary, CatalogError> {
        let path = self.source.as_ref().ok_or(CatalogError::NoSource)?;
        let fresh = load_records(path).await?;
        let summary = fresh.summary();

        *self.records.write().await = fresh;
        info!("Reloaded clinic catalog: {:?}", summary);

        Ok(summary)
    }

    pub async fn create_promotion(&self, input: PromotionInput) -> Result<PromotionRecord, CatalogError> {
        reject_invalid(input.validate())?;

        let mut records = self.records.write().await;
        let id = records.promotions.iter().map(|promo| promo.id).max().unwrap_or(0) + 1;
        let promotion = input.into_record(id);
        records.promotions.push(promotion.clone());

        info!("Created promotion {} ({})", id, promotion.title);
        Ok(promotion)
    }

    pub async fn update_promotion(&self, id: u32, input: PromotionInput) -> Result<PromotionRecord, CatalogError> {
        reject_invalid(input.validate())?;

        let mut records = self.records.write().await;
        let slot = records
            .promotions
            .iter_mut()
            .find(|promo| promo.id == id)
            .ok_or(CatalogError::PromotionNotFound(id))?;
        *slot = input.into_record(id);

        info!("Updated promotion {}", id);
        Ok(slot.clone())
    }

    pub async fn delete_promotion(&self, id: u32) -> Result<(), CatalogError> {
        let mut records = self.records.write().await;
        let before = records.promotions.len();
        records.promotions.retain(|promo| promo.id != id);
        if records.promotions.len() == before {
            return Err(CatalogError::PromotionNotFound(id));
        }

        info!("Deleted promotion {}", id);
        Ok(())
    }

    /// Ids continue the `dr<n>` sequence of the current list.
    pub async fn create_doctor(&self, input: DoctorInput) -> Result<DoctorRecord, CatalogError> {
        reject_invalid(input.validate())?;

        let mut records = self.records.write().await;
        let next = records
            .doctors
            .iter()
            .filter_map(|doc| doc.id.strip_prefix("dr")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let doctor = input.into_record(format!("dr{}", next));
        records.doctors.push(doctor.clone());

        info!("Added doctor {} ({})", doctor.id, doctor.name);
        Ok(doctor)
    }
}

fn reject_invalid(errors: crate::models::FieldErrors) -> Result<(), CatalogError> {
    if errors.is_empty() {
        Ok(())
    } else {
        debug!("Rejected catalog edit: {:?}", errors);
        Err(CatalogError::Invalid(errors))
    }
}

async fn load_records(path: &Path) -> Result<ClinicRecords, CatalogError> {
    debug!("Reading clinic catalog from {}", path.display());

    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;

    serde_json::from_str(&raw).map_err(|source| CatalogError::Parse { path: path.to_path_buf(), source })
}
