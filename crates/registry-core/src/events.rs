//! 登记事件定义
//!
//! 每个成功的变更操作发出一个事件，投递为“发出即忘”，不影响操作结果。

use crate::models::{Identity, ImageId, PatientId, PractitionerId};
use serde::{Deserialize, Serialize};

/// 登记事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEvent {
    PatientRegistered {
        patient_id: PatientId,
        identity: Identity,
        name: String,
    },
    PractitionerRegistered {
        practitioner_id: PractitionerId,
        identity: Identity,
        name: String,
        registered_by: Identity,
    },
    BeforeImageUploaded {
        image_id: ImageId,
        patient_id: PatientId,
        before_cid: String,
    },
    AfterImageUploaded {
        image_id: ImageId,
        patient_id: PatientId,
        after_cid: String,
    },
    ReviewSubmitted {
        practitioner_id: PractitionerId,
        patient_id: PatientId,
        reviewer: Identity,
        rating: u8,
        new_rating: u8,
    },
    PatientAddedToPractitioner {
        patient_id: PatientId,
        practitioner_id: PractitionerId,
        amount: u64,
    },
}

impl RegistryEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PatientRegistered { .. } => "patient.registered",
            Self::PractitionerRegistered { .. } => "practitioner.registered",
            Self::BeforeImageUploaded { .. } => "image.before_uploaded",
            Self::AfterImageUploaded { .. } => "image.after_uploaded",
            Self::ReviewSubmitted { .. } => "review.submitted",
            Self::PatientAddedToPractitioner { .. } => "practitioner.patient_added",
        }
    }
}

/// 事件接收端特征
///
/// 实现不得阻塞，也不能向调用方报告失败。
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &RegistryEvent);
}

/// 丢弃所有事件的接收端
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn publish(&self, event: &RegistryEvent) {
        tracing::trace!("Discarding event {}", event.kind());
    }
}
