//! 共享登记表
//!
//! 单写多读：所有变更在写锁内整体执行，查询持有读锁，读者不会观察到部分修改。

use crate::registry::Registry;
use registry_core::{
    Identity, Image, ImageId, Patient, PatientId, Practitioner, PractitionerId, RegistryStats,
    Result, ReviewColumns,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// 可跨任务共享的登记表句柄
#[derive(Debug, Clone)]
pub struct SharedRegistry {
    inner: Arc<RwLock<Registry>>,
}

impl SharedRegistry {
    pub fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    /// 在写锁内执行任意一组操作
    pub async fn write<T>(&self, f: impl FnOnce(&mut Registry) -> T) -> T {
        let mut registry = self.inner.write().await;
        f(&mut *registry)
    }

    /// 在读锁内执行查询
    pub async fn read<T>(&self, f: impl FnOnce(&Registry) -> T) -> T {
        let registry = self.inner.read().await;
        f(&*registry)
    }

    pub async fn register_patient(
        &self,
        name: String,
        birth_date: String,
        weight: u32,
        height: u32,
        sex: String,
        caller: &Identity,
    ) -> Result<PatientId> {
        self.write(|r| r.register_patient(name, birth_date, weight, height, sex, caller))
            .await
    }

    pub async fn register_practitioner(
        &self,
        name: String,
        practitioner_identity: &Identity,
        services_offered: String,
        caller: &Identity,
    ) -> Result<PractitionerId> {
        self.write(|r| r.register_practitioner(name, practitioner_identity, services_offered, caller))
            .await
    }

    pub async fn upload_before_image(
        &self,
        patient_id: PatientId,
        before_cid: String,
        caller: &Identity,
    ) -> Result<ImageId> {
        self.write(|r| r.upload_before_image(patient_id, before_cid, caller)).await
    }

    pub async fn upload_after_image(
        &self,
        image_id: ImageId,
        after_cid: String,
        caller: &Identity,
    ) -> Result<()> {
        self.write(|r| r.upload_after_image(image_id, after_cid, caller)).await
    }

    pub async fn submit_review(
        &self,
        patient_id: PatientId,
        practitioner_id: PractitionerId,
        rating: i64,
        comment: String,
        caller: &Identity,
    ) -> Result<()> {
        self.write(|r| r.submit_review(patient_id, practitioner_id, rating, comment, caller))
            .await
    }

    pub async fn link_patient_to_practitioner(
        &self,
        patient_id: PatientId,
        practitioner_id: PractitionerId,
        caller: &Identity,
        amount: u64,
    ) -> Result<()> {
        self.write(|r| r.link_patient_to_practitioner(patient_id, practitioner_id, caller, amount))
            .await
    }

    pub async fn patient(&self, patient_id: PatientId) -> Patient {
        self.read(|r| r.patient(patient_id)).await
    }

    pub async fn practitioner(&self, practitioner_id: PractitionerId) -> Practitioner {
        self.read(|r| r.practitioner(practitioner_id)).await
    }

    pub async fn image(&self, image_id: ImageId) -> Image {
        self.read(|r| r.image(image_id)).await
    }

    pub async fn patient_ids(&self) -> Vec<PatientId> {
        self.read(|r| r.patient_ids()).await
    }

    pub async fn practitioner_ids(&self) -> Vec<PractitionerId> {
        self.read(|r| r.practitioner_ids()).await
    }

    pub async fn image_ids(&self) -> Vec<ImageId> {
        self.read(|r| r.image_ids()).await
    }

    pub async fn reviews(&self, practitioner_id: PractitionerId) -> ReviewColumns {
        self.read(|r| r.reviews(practitioner_id)).await
    }

    pub async fn patient_by_address(&self, identity: &Identity) -> Result<Patient> {
        self.read(|r| r.patient_by_address(identity).cloned()).await
    }

    pub async fn practitioner_by_address(&self, identity: &Identity) -> Result<Practitioner> {
        self.read(|r| r.practitioner_by_address(identity).cloned()).await
    }

    pub async fn stats(&self) -> RegistryStats {
        self.read(|r| r.stats()).await
    }
}
