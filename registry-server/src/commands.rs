//! JSON 行命令适配器
//!
//! 每行一个命令（按 `op` 字段区分），每个命令输出一行响应：
//! `{"ok": ...}` 或 `{"error": {"kind": ..., "message": ...}}`

use registry_core::{Identity, ImageId, PatientId, PractitionerId, RegistryError};
use registry_engine::SharedRegistry;
use registry_integration::InMemoryLedger;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// 登记命令
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    RegisterPatient {
        caller: Identity,
        name: String,
        #[serde(default)]
        birth_date: String,
        #[serde(default)]
        weight: u32,
        #[serde(default)]
        height: u32,
        #[serde(default)]
        sex: String,
    },
    RegisterPractitioner {
        caller: Identity,
        name: String,
        identity: Identity,
        #[serde(default)]
        services_offered: String,
    },
    UploadBeforeImage {
        caller: Identity,
        patient_id: PatientId,
        before_cid: String,
    },
    UploadAfterImage {
        caller: Identity,
        image_id: ImageId,
        after_cid: String,
    },
    SubmitReview {
        caller: Identity,
        patient_id: PatientId,
        practitioner_id: PractitionerId,
        rating: i64,
        #[serde(default)]
        comment: String,
    },
    LinkPatient {
        caller: Identity,
        patient_id: PatientId,
        practitioner_id: PractitionerId,
        #[serde(default)]
        amount: u64,
    },
    GetPatient {
        patient_id: PatientId,
    },
    GetPractitioner {
        practitioner_id: PractitionerId,
    },
    GetImage {
        image_id: ImageId,
    },
    ListPatients,
    ListPractitioners,
    ListImages,
    GetReviews {
        practitioner_id: PractitionerId,
    },
    FindPatient {
        identity: Identity,
    },
    FindPractitioner {
        identity: Identity,
    },
    Stats,
    Balance {
        identity: Identity,
    },
}

/// 命令响应
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Ok(Value),
    Error { kind: String, message: String },
}

impl Response {
    fn from_result<T: Serialize>(result: Result<T, RegistryError>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(e) => Self::Error {
                kind: e.kind().to_string(),
                message: e.to_string(),
            },
        }
    }

    fn ok<T: Serialize>(value: T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Self::Ok(value),
            Err(e) => Self::Error {
                kind: "internal".to_string(),
                message: e.to_string(),
            },
        }
    }

    #[cfg(test)]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

/// 命令执行器
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    registry: SharedRegistry,
    ledger: Arc<InMemoryLedger>,
}

impl CommandExecutor {
    pub fn new(registry: SharedRegistry, ledger: Arc<InMemoryLedger>) -> Self {
        Self { registry, ledger }
    }

    /// 解析并执行一行命令
    pub async fn execute_line(&self, line: &str) -> Response {
        match serde_json::from_str::<Command>(line) {
            Ok(command) => self.execute(command).await,
            Err(e) => {
                tracing::warn!("Rejected malformed command: {}", e);
                Response::Error {
                    kind: "invalid_command".to_string(),
                    message: e.to_string(),
                }
            }
        }
    }

    /// 执行命令
    pub async fn execute(&self, command: Command) -> Response {
        tracing::debug!("Executing command {:?}", command);
        let registry = &self.registry;

        match command {
            Command::RegisterPatient {
                caller,
                name,
                birth_date,
                weight,
                height,
                sex,
            } => Response::from_result(
                registry
                    .register_patient(name, birth_date, weight, height, sex, &caller)
                    .await
                    .map(|id| json!({ "patient_id": id })),
            ),
            Command::RegisterPractitioner {
                caller,
                name,
                identity,
                services_offered,
            } => Response::from_result(
                registry
                    .register_practitioner(name, &identity, services_offered, &caller)
                    .await
                    .map(|id| json!({ "practitioner_id": id })),
            ),
            Command::UploadBeforeImage {
                caller,
                patient_id,
                before_cid,
            } => Response::from_result(
                registry
                    .upload_before_image(patient_id, before_cid, &caller)
                    .await
                    .map(|id| json!({ "image_id": id })),
            ),
            Command::UploadAfterImage {
                caller,
                image_id,
                after_cid,
            } => Response::from_result(registry.upload_after_image(image_id, after_cid, &caller).await),
            Command::SubmitReview {
                caller,
                patient_id,
                practitioner_id,
                rating,
                comment,
            } => Response::from_result(
                registry
                    .submit_review(patient_id, practitioner_id, rating, comment, &caller)
                    .await,
            ),
            Command::LinkPatient {
                caller,
                patient_id,
                practitioner_id,
                amount,
            } => Response::from_result(
                registry
                    .link_patient_to_practitioner(patient_id, practitioner_id, &caller, amount)
                    .await,
            ),
            Command::GetPatient { patient_id } => Response::ok(registry.patient(patient_id).await),
            Command::GetPractitioner { practitioner_id } => {
                Response::ok(registry.practitioner(practitioner_id).await)
            }
            Command::GetImage { image_id } => Response::ok(registry.image(image_id).await),
            Command::ListPatients => Response::ok(registry.patient_ids().await),
            Command::ListPractitioners => Response::ok(registry.practitioner_ids().await),
            Command::ListImages => Response::ok(registry.image_ids().await),
            Command::GetReviews { practitioner_id } => {
                Response::ok(registry.reviews(practitioner_id).await)
            }
            Command::FindPatient { identity } => {
                Response::from_result(registry.patient_by_address(&identity).await)
            }
            Command::FindPractitioner { identity } => {
                Response::from_result(registry.practitioner_by_address(&identity).await)
            }
            Command::Stats => Response::ok(registry.stats().await),
            Command::Balance { identity } => {
                let balance = self.ledger.balance(&identity);
                Response::ok(json!({ "identity": identity, "balance": balance }))
            }
        }
    }
}
