//! 登记引擎
//!
//! 持有患者、从业者、影像三张稀疏表以及按从业者分组的评价列表，
//! 所有变更操作在入口处做所有者校验，成功后发出一个事件。
//! 失败的操作不会留下任何部分修改。

use crate::access::authorize;
use crate::rating::incremental_average;
use crate::store::SparseTable;
use registry_core::utils::{require_non_empty, validate_rating};
use registry_core::{
    EventSink, Identity, Image, ImageId, Patient, PatientId, Practitioner, PractitionerId,
    RegistryError, RegistryEvent, RegistryStats, Result, Review, ReviewColumns, ValueTransfer,
};
use std::collections::HashMap;
use std::sync::Arc;

/// 治疗登记表
pub struct Registry {
    patients: SparseTable<PatientId, Patient>,
    practitioners: SparseTable<PractitionerId, Practitioner>,
    images: SparseTable<ImageId, Image>,
    reviews: HashMap<PractitionerId, Vec<Review>>,
    /// 支付协作者
    ledger: Arc<dyn ValueTransfer>,
    /// 事件接收端
    events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("patients_count", &self.patients.counter())
            .field("practitioners_count", &self.practitioners.counter())
            .field("images_count", &self.images.counter())
            .field("reviewed_practitioners", &self.reviews.len())
            .finish()
    }
}

impl Registry {
    /// 创建新的登记表
    pub fn new(ledger: Arc<dyn ValueTransfer>, events: Arc<dyn EventSink>) -> Self {
        Self {
            patients: SparseTable::new(),
            practitioners: SparseTable::new(),
            images: SparseTable::new(),
            reviews: HashMap::new(),
            ledger,
            events,
        }
    }

    /// 注册患者，所有者为调用者
    pub fn register_patient(
        &mut self,
        name: impl Into<String>,
        birth_date: impl Into<String>,
        weight: u32,
        height: u32,
        sex: impl Into<String>,
        caller: &Identity,
    ) -> Result<PatientId> {
        let name = name.into();
        let patient_id = self.patients.insert_next(|id| Patient {
            id,
            identity: caller.clone(),
            name: name.clone(),
            birth_date: birth_date.into(),
            weight,
            height,
            sex: sex.into(),
            image_ids: Vec::new(),
        });

        tracing::info!("Registered patient {} for {}", patient_id, caller);
        self.emit(RegistryEvent::PatientRegistered {
            patient_id,
            identity: caller.clone(),
            name,
        });
        Ok(patient_id)
    }

    /// 注册从业者
    ///
    /// 所有者身份由参数提供，调用者可以代任意地址注册。
    pub fn register_practitioner(
        &mut self,
        name: impl Into<String>,
        practitioner_identity: &Identity,
        services_offered: impl Into<String>,
        caller: &Identity,
    ) -> Result<PractitionerId> {
        let name = name.into();
        let practitioner_id = self.practitioners.insert_next(|id| Practitioner {
            id,
            identity: practitioner_identity.clone(),
            name: name.clone(),
            star_rating: 0,
            services_offered: services_offered.into(),
            patient_ids: Vec::new(),
        });

        tracing::info!(
            "Registered practitioner {} owned by {} (registered by {})",
            practitioner_id,
            practitioner_identity,
            caller
        );
        self.emit(RegistryEvent::PractitionerRegistered {
            practitioner_id,
            identity: practitioner_identity.clone(),
            name,
            registered_by: caller.clone(),
        });
        Ok(practitioner_id)
    }

    /// 上传治疗前影像
    pub fn upload_before_image(
        &mut self,
        patient_id: PatientId,
        before_cid: impl Into<String>,
        caller: &Identity,
    ) -> Result<ImageId> {
        authorize(&self.patient_owner(patient_id), caller, format!("patient {}", patient_id))?;

        let before_cid = before_cid.into();
        require_non_empty("before_cid", &before_cid)?;

        let patient = self
            .patients
            .get_mut(patient_id)
            .ok_or_else(|| RegistryError::NotFound(format!("Patient {} not found", patient_id)))?;

        let image_id = self.images.insert_next(|id| Image {
            id,
            patient_id,
            before_cid: before_cid.clone(),
            after_cid: String::new(),
            completed: false,
        });
        patient.image_ids.push(image_id);

        tracing::info!("Uploaded before image {} for patient {}", image_id, patient_id);
        self.emit(RegistryEvent::BeforeImageUploaded {
            image_id,
            patient_id,
            before_cid,
        });
        Ok(image_id)
    }

    /// 上传治疗后影像，只能设置一次
    pub fn upload_after_image(
        &mut self,
        image_id: ImageId,
        after_cid: impl Into<String>,
        caller: &Identity,
    ) -> Result<()> {
        let patient_id = self
            .images
            .get(image_id)
            .map(|image| image.patient_id)
            .unwrap_or_default();
        authorize(&self.patient_owner(patient_id), caller, format!("image {}", image_id))?;

        let after_cid = after_cid.into();
        require_non_empty("after_cid", &after_cid)?;

        let image = self
            .images
            .get_mut(image_id)
            .ok_or_else(|| RegistryError::NotFound(format!("Image {} not found", image_id)))?;

        if image.has_after_image() {
            return Err(RegistryError::AlreadyExists(format!(
                "Image {} already has an after image",
                image_id
            )));
        }

        image.after_cid = after_cid.clone();
        image.completed = true;

        tracing::info!("Uploaded after image for image {} (patient {})", image_id, patient_id);
        self.emit(RegistryEvent::AfterImageUploaded {
            image_id,
            patient_id,
            after_cid,
        });
        Ok(())
    }

    /// 提交评价并更新星级
    ///
    /// 调用者必须是从业者本人；评价者记录为调用者，`patient_id` 仅作为事件标签。
    pub fn submit_review(
        &mut self,
        patient_id: PatientId,
        practitioner_id: PractitionerId,
        rating: i64,
        comment: impl Into<String>,
        caller: &Identity,
    ) -> Result<()> {
        authorize(
            &self.practitioner_owner(practitioner_id),
            caller,
            format!("practitioner {}", practitioner_id),
        )?;
        let rating = validate_rating(rating)?;

        let practitioner = self.practitioners.get_mut(practitioner_id).ok_or_else(|| {
            RegistryError::NotFound(format!("Practitioner {} not found", practitioner_id))
        })?;
        let reviews = self.reviews.entry(practitioner_id).or_default();

        let new_rating = incremental_average(practitioner.star_rating, reviews.len(), rating);
        reviews.push(Review {
            reviewer: caller.clone(),
            rating,
            comment: comment.into(),
        });
        practitioner.star_rating = new_rating;

        tracing::info!(
            "Review submitted for practitioner {}: rating {} -> star rating {}",
            practitioner_id,
            rating,
            new_rating
        );
        self.emit(RegistryEvent::ReviewSubmitted {
            practitioner_id,
            patient_id,
            reviewer: caller.clone(),
            rating,
            new_rating,
        });
        Ok(())
    }

    /// 将患者关联到从业者并支付费用
    ///
    /// 转账失败时撤销对患者列表的追加，整体不生效。
    pub fn link_patient_to_practitioner(
        &mut self,
        patient_id: PatientId,
        practitioner_id: PractitionerId,
        caller: &Identity,
        amount: u64,
    ) -> Result<()> {
        authorize(&self.patient_owner(patient_id), caller, format!("patient {}", patient_id))?;

        let practitioner = match self.practitioners.get_mut(practitioner_id) {
            Some(practitioner) if !practitioner.identity.is_unset() => practitioner,
            _ => {
                return Err(RegistryError::NotFound(format!(
                    "Practitioner {} not found",
                    practitioner_id
                )))
            }
        };

        let previous_len = practitioner.patient_ids.len();
        practitioner.patient_ids.push(patient_id);

        if let Err(e) = self.ledger.transfer(caller, &practitioner.identity, amount) {
            practitioner.patient_ids.truncate(previous_len);
            tracing::warn!(
                "Transfer of {} from {} to practitioner {} failed: {}",
                amount,
                caller,
                practitioner_id,
                e
            );
            return Err(RegistryError::TransferFailed(e));
        }

        tracing::info!(
            "Linked patient {} to practitioner {} with payment {}",
            patient_id,
            practitioner_id,
            amount
        );
        self.emit(RegistryEvent::PatientAddedToPractitioner {
            patient_id,
            practitioner_id,
            amount,
        });
        Ok(())
    }

    /// 原始读取患者，未分配的ID返回零值记录
    pub fn patient(&self, patient_id: PatientId) -> Patient {
        self.patients.get_or_default(patient_id)
    }

    /// 原始读取从业者
    pub fn practitioner(&self, practitioner_id: PractitionerId) -> Practitioner {
        self.practitioners.get_or_default(practitioner_id)
    }

    /// 原始读取影像
    pub fn image(&self, image_id: ImageId) -> Image {
        self.images.get_or_default(image_id)
    }

    pub fn try_patient(&self, patient_id: PatientId) -> Result<&Patient> {
        self.patients
            .get(patient_id)
            .ok_or_else(|| RegistryError::NotFound(format!("Patient {} not found", patient_id)))
    }

    pub fn try_practitioner(&self, practitioner_id: PractitionerId) -> Result<&Practitioner> {
        self.practitioners.get(practitioner_id).ok_or_else(|| {
            RegistryError::NotFound(format!("Practitioner {} not found", practitioner_id))
        })
    }

    pub fn try_image(&self, image_id: ImageId) -> Result<&Image> {
        self.images
            .get(image_id)
            .ok_or_else(|| RegistryError::NotFound(format!("Image {} not found", image_id)))
    }

    pub fn patient_ids(&self) -> Vec<PatientId> {
        self.patients.ids()
    }

    pub fn practitioner_ids(&self) -> Vec<PractitionerId> {
        self.practitioners.ids()
    }

    pub fn image_ids(&self) -> Vec<ImageId> {
        self.images.ids()
    }

    /// 获取从业者的评价，未知ID返回空列表
    pub fn reviews(&self, practitioner_id: PractitionerId) -> ReviewColumns {
        self.reviews
            .get(&practitioner_id)
            .map(|reviews| reviews.iter().collect())
            .unwrap_or_default()
    }

    /// 按身份查找患者，返回ID最小的匹配项
    pub fn patient_by_address(&self, identity: &Identity) -> Result<&Patient> {
        self.patients
            .iter()
            .find(|(_, patient)| &patient.identity == identity)
            .map(|(_, patient)| patient)
            .ok_or_else(|| RegistryError::NotFound(format!("Patient not found for {}", identity)))
    }

    /// 按身份查找从业者
    pub fn practitioner_by_address(&self, identity: &Identity) -> Result<&Practitioner> {
        self.practitioners
            .iter()
            .find(|(_, practitioner)| &practitioner.identity == identity)
            .map(|(_, practitioner)| practitioner)
            .ok_or_else(|| {
                RegistryError::NotFound(format!("Practitioner not found for {}", identity))
            })
    }

    /// 获取患者的全部影像，按上传顺序
    pub fn patient_images(&self, patient_id: PatientId) -> Vec<Image> {
        self.patients
            .get(patient_id)
            .map(|patient| {
                patient
                    .image_ids
                    .iter()
                    .filter_map(|&image_id| self.images.get(image_id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 获取从业者关联的患者（可能重复）
    pub fn practitioner_patients(&self, practitioner_id: PractitionerId) -> Vec<PatientId> {
        self.practitioners
            .get(practitioner_id)
            .map(|practitioner| practitioner.patient_ids.clone())
            .unwrap_or_default()
    }

    /// 获取登记表统计
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            total_patients: self.patients.counter(),
            total_practitioners: self.practitioners.counter(),
            total_images: self.images.counter(),
            completed_images: self.images.iter().filter(|(_, image)| image.completed).count() as u64,
            total_reviews: self.reviews.values().map(|reviews| reviews.len() as u64).sum(),
        }
    }

    fn patient_owner(&self, patient_id: PatientId) -> Identity {
        self.patients
            .get(patient_id)
            .map(|patient| patient.identity.clone())
            .unwrap_or_default()
    }

    fn practitioner_owner(&self, practitioner_id: PractitionerId) -> Identity {
        self.practitioners
            .get(practitioner_id)
            .map(|practitioner| practitioner.identity.clone())
            .unwrap_or_default()
    }

    fn emit(&self, event: RegistryEvent) {
        tracing::debug!("Emitting event: {}", event.kind());
        self.events.publish(&event);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use registry_core::TransferError;
    use std::sync::Mutex;

    /// 记录所有事件的测试接收端
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub events: Mutex<Vec<RegistryEvent>>,
    }

    impl RecordingSink {
        pub fn kinds(&self) -> Vec<&'static str> {
            self.events.lock().unwrap().iter().map(|e| e.kind()).collect()
        }
    }

    impl EventSink for RecordingSink {
        fn publish(&self, event: &RegistryEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    /// 可切换成功/失败的测试账本
    #[derive(Default)]
    pub(crate) struct SwitchLedger {
        pub fail: Mutex<bool>,
        pub transfers: Mutex<Vec<(Identity, Identity, u64)>>,
    }

    impl ValueTransfer for SwitchLedger {
        fn transfer(&self, from: &Identity, to: &Identity, amount: u64) -> std::result::Result<(), TransferError> {
            if *self.fail.lock().unwrap() {
                return Err(TransferError::Unavailable("ledger offline".to_string()));
            }
            self.transfers.lock().unwrap().push((from.clone(), to.clone(), amount));
            Ok(())
        }
    }

    pub(crate) fn setup() -> (Registry, Arc<SwitchLedger>, Arc<RecordingSink>) {
        let ledger = Arc::new(SwitchLedger::default());
        let sink = Arc::new(RecordingSink::default());
        let registry = Registry::new(ledger.clone(), sink.clone());
        (registry, ledger, sink)
    }

    fn alice() -> Identity {
        Identity::from("0xalice")
    }

    fn doctor() -> Identity {
        Identity::from("0xdoctor")
    }

    fn register_alice(registry: &mut Registry) -> PatientId {
        registry
            .register_patient("Alice", "1990-01-01", 60, 170, "F", &alice())
            .unwrap()
    }

    fn register_doctor(registry: &mut Registry) -> PractitionerId {
        registry
            .register_practitioner("Dr. Who", &doctor(), "botox", &Identity::from("0xadmin"))
            .unwrap()
    }

    #[test]
    fn test_registration_ids_increment() {
        let (mut registry, _, sink) = setup();

        let first = register_alice(&mut registry);
        let second = registry
            .register_patient("", "", 0, 0, "", &Identity::from("0xbob"))
            .unwrap();
        let practitioner = register_doctor(&mut registry);

        assert_eq!(first, PatientId(1));
        assert_eq!(second, PatientId(2));
        assert_eq!(practitioner, PractitionerId(1));
        assert_eq!(registry.patient_ids(), vec![PatientId(1), PatientId(2)]);
        assert_eq!(
            sink.kinds(),
            vec!["patient.registered", "patient.registered", "practitioner.registered"]
        );

        let stored = registry.practitioner(practitioner);
        assert_eq!(stored.identity, doctor());
        assert_eq!(stored.star_rating, 0);
        assert!(stored.patient_ids.is_empty());
    }

    #[test]
    fn test_before_and_after_image_scenario() {
        let (mut registry, _, _) = setup();
        let patient_id = register_alice(&mut registry);

        let image_id = registry.upload_before_image(patient_id, "cidA", &alice()).unwrap();
        registry.upload_after_image(image_id, "cidB", &alice()).unwrap();

        let image = registry.image(image_id);
        assert_eq!(
            (image.patient_id, image.before_cid.as_str(), image.after_cid.as_str(), image.completed),
            (patient_id, "cidA", "cidB", true)
        );
        assert_eq!(registry.patient(patient_id).image_ids, vec![image_id]);
    }

    #[test]
    fn test_upload_before_image_requires_owner() {
        let (mut registry, _, sink) = setup();
        let patient_id = register_alice(&mut registry);

        let result = registry.upload_before_image(patient_id, "cidA", &Identity::from("0xmallory"));
        assert!(matches!(result, Err(RegistryError::Unauthorized(_))));

        let result = registry.upload_before_image(patient_id, "", &alice());
        assert!(matches!(result, Err(RegistryError::InvalidArgument(_))));

        let result = registry.upload_before_image(PatientId(42), "cidA", &alice());
        assert!(matches!(result, Err(RegistryError::Unauthorized(_))));

        assert!(registry.image_ids().is_empty());
        assert!(registry.patient(patient_id).image_ids.is_empty());
        assert_eq!(sink.kinds(), vec!["patient.registered"]);
    }

    #[test]
    fn test_after_image_is_set_once() {
        let (mut registry, _, sink) = setup();
        let patient_id = register_alice(&mut registry);
        let image_id = registry.upload_before_image(patient_id, "cidA", &alice()).unwrap();

        registry.upload_after_image(image_id, "cidB", &alice()).unwrap();
        let second = registry.upload_after_image(image_id, "cidC", &alice());

        assert!(matches!(second, Err(RegistryError::AlreadyExists(_))));
        assert_eq!(registry.image(image_id).after_cid, "cidB");
        assert_eq!(sink.kinds().iter().filter(|k| **k == "image.after_uploaded").count(), 1);
    }

    #[test]
    fn test_after_image_validation() {
        let (mut registry, _, _) = setup();
        let patient_id = register_alice(&mut registry);
        let image_id = registry.upload_before_image(patient_id, "cidA", &alice()).unwrap();

        assert!(matches!(
            registry.upload_after_image(image_id, "cidB", &doctor()),
            Err(RegistryError::Unauthorized(_))
        ));
        assert!(matches!(
            registry.upload_after_image(image_id, "", &alice()),
            Err(RegistryError::InvalidArgument(_))
        ));
        assert!(matches!(
            registry.upload_after_image(ImageId(99), "cidB", &alice()),
            Err(RegistryError::Unauthorized(_))
        ));
        assert!(!registry.image(image_id).completed);
    }

    #[test]
    fn test_review_rating_sequence() {
        let (mut registry, _, _) = setup();
        let patient_id = register_alice(&mut registry);
        let practitioner_id = register_doctor(&mut registry);

        let mut observed = Vec::new();
        for (rating, comment) in [(4, "great"), (2, "ok"), (5, "superb")] {
            registry
                .submit_review(patient_id, practitioner_id, rating, comment, &doctor())
                .unwrap();
            observed.push(registry.practitioner(practitioner_id).star_rating);
        }
        assert_eq!(observed, vec![4, 3, 3]);

        let reviews = registry.reviews(practitioner_id);
        assert_eq!(reviews.reviewers.len(), 3);
        assert_eq!(reviews.ratings, vec![4, 2, 5]);
        assert_eq!(reviews.comments, vec!["great", "ok", "superb"]);
        assert!(reviews.reviewers.iter().all(|r| *r == doctor()));
    }

    #[test]
    fn test_review_rejections_leave_state_untouched() {
        let (mut registry, _, sink) = setup();
        let patient_id = register_alice(&mut registry);
        let practitioner_id = register_doctor(&mut registry);

        assert!(matches!(
            registry.submit_review(patient_id, practitioner_id, 4, "", &alice()),
            Err(RegistryError::Unauthorized(_))
        ));
        for rating in [6, -1, 300] {
            assert!(matches!(
                registry.submit_review(patient_id, practitioner_id, rating, "", &doctor()),
                Err(RegistryError::InvalidArgument(_))
            ));
        }
        // 越界评分仍先做身份校验
        assert!(matches!(
            registry.submit_review(patient_id, practitioner_id, -1, "", &alice()),
            Err(RegistryError::Unauthorized(_))
        ));
        assert!(matches!(
            registry.submit_review(patient_id, PractitionerId(7), 3, "", &doctor()),
            Err(RegistryError::Unauthorized(_))
        ));

        assert!(registry.reviews(practitioner_id).is_empty());
        assert_eq!(registry.practitioner(practitioner_id).star_rating, 0);
        assert!(!sink.kinds().contains(&"review.submitted"));
    }

    #[test]
    fn test_review_event_labels_patient() {
        let (mut registry, _, sink) = setup();
        let practitioner_id = register_doctor(&mut registry);

        // 患者ID不做存在性校验
        registry
            .submit_review(PatientId(500), practitioner_id, 5, "", &doctor())
            .unwrap();

        let events = sink.events.lock().unwrap();
        match events.last() {
            Some(RegistryEvent::ReviewSubmitted { patient_id, reviewer, new_rating, .. }) => {
                assert_eq!(*patient_id, PatientId(500));
                assert_eq!(*reviewer, doctor());
                assert_eq!(*new_rating, 5);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_link_patient_transfers_payment() {
        let (mut registry, ledger, sink) = setup();
        let patient_id = register_alice(&mut registry);
        let practitioner_id = register_doctor(&mut registry);

        registry
            .link_patient_to_practitioner(patient_id, practitioner_id, &alice(), 100)
            .unwrap();
        registry
            .link_patient_to_practitioner(patient_id, practitioner_id, &alice(), 50)
            .unwrap();

        assert_eq!(registry.practitioner_patients(practitioner_id), vec![patient_id, patient_id]);
        assert_eq!(
            *ledger.transfers.lock().unwrap(),
            vec![(alice(), doctor(), 100), (alice(), doctor(), 50)]
        );
        assert_eq!(sink.kinds().last(), Some(&"practitioner.patient_added"));
    }

    #[test]
    fn test_link_rolls_back_on_transfer_failure() {
        let (mut registry, ledger, sink) = setup();
        let patient_id = register_alice(&mut registry);
        let practitioner_id = register_doctor(&mut registry);
        registry
            .link_patient_to_practitioner(patient_id, practitioner_id, &alice(), 10)
            .unwrap();
        let events_before = sink.kinds().len();

        *ledger.fail.lock().unwrap() = true;
        let result = registry.link_patient_to_practitioner(patient_id, practitioner_id, &alice(), 10);

        assert!(matches!(result, Err(RegistryError::TransferFailed(_))));
        assert_eq!(registry.practitioner_patients(practitioner_id).len(), 1);
        assert_eq!(sink.kinds().len(), events_before);
    }

    #[test]
    fn test_link_requires_owner_and_known_practitioner() {
        let (mut registry, _, _) = setup();
        let patient_id = register_alice(&mut registry);
        let practitioner_id = register_doctor(&mut registry);
        let ghost = registry
            .register_practitioner("Ghost", &Identity::unset(), "", &alice())
            .unwrap();

        assert!(matches!(
            registry.link_patient_to_practitioner(patient_id, practitioner_id, &doctor(), 1),
            Err(RegistryError::Unauthorized(_))
        ));
        assert!(matches!(
            registry.link_patient_to_practitioner(patient_id, ghost, &alice(), 1),
            Err(RegistryError::NotFound(_))
        ));
        assert!(matches!(
            registry.link_patient_to_practitioner(patient_id, PractitionerId(99), &alice(), 1),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn test_raw_reads_return_default_records() {
        let (mut registry, _, _) = setup();
        register_alice(&mut registry);

        assert_eq!(registry.patient(PatientId(5)), Patient::default());
        assert_eq!(registry.practitioner(PractitionerId(1)), Practitioner::default());
        assert_eq!(registry.image(ImageId(0)), Image::default());
        assert!(matches!(registry.try_patient(PatientId(5)), Err(RegistryError::NotFound(_))));
        assert!(registry.try_patient(PatientId(1)).is_ok());
    }

    #[test]
    fn test_lookup_by_address() {
        let (mut registry, _, _) = setup();
        let first = register_alice(&mut registry);
        register_alice(&mut registry);
        let practitioner_id = register_doctor(&mut registry);

        assert_eq!(registry.patient_by_address(&alice()).unwrap().id, first);
        assert_eq!(registry.practitioner_by_address(&doctor()).unwrap().id, practitioner_id);
        assert!(matches!(
            registry.patient_by_address(&Identity::from("0xnobody")),
            Err(RegistryError::NotFound(_))
        ));
        assert!(matches!(
            registry.practitioner_by_address(&alice()),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn test_stats_and_patient_images() {
        let (mut registry, _, _) = setup();
        let patient_id = register_alice(&mut registry);
        let practitioner_id = register_doctor(&mut registry);
        let first = registry.upload_before_image(patient_id, "a1", &alice()).unwrap();
        registry.upload_before_image(patient_id, "a2", &alice()).unwrap();
        registry.upload_after_image(first, "b1", &alice()).unwrap();
        registry
            .submit_review(patient_id, practitioner_id, 3, "fine", &doctor())
            .unwrap();

        let images = registry.patient_images(patient_id);
        assert_eq!(images.len(), 2);
        assert!(images.iter().all(|image| image.patient_id == patient_id));

        let stats = registry.stats();
        assert_eq!(stats.total_patients, 1);
        assert_eq!(stats.total_practitioners, 1);
        assert_eq!(stats.total_images, 2);
        assert_eq!(stats.completed_images, 1);
        assert_eq!(stats.total_reviews, 1);
    }
}
