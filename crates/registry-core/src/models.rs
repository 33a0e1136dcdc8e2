//! 核心数据模型定义

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// 0 永远不指向有效记录
            pub fn is_assigned(&self) -> bool {
                self.0 != 0
            }

            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// 患者ID
    PatientId
);
define_id!(
    /// 从业者ID
    PractitionerId
);
define_id!(
    /// 影像ID
    ImageId
);

/// 调用者/所有者身份
///
/// 不透明的已认证身份值，核心只做相等比较。空字符串为未设置（零地址）哨兵值。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 未设置的身份
    pub fn unset() -> Self {
        Self(String::new())
    }

    pub fn is_unset(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unset() {
            write!(f, "<unset>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// 患者信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub identity: Identity,           // 所有者身份
    pub name: String,                 // 患者姓名
    pub birth_date: String,           // 出生日期
    pub weight: u32,                  // 体重
    pub height: u32,                  // 身高
    pub sex: String,                  // 性别
    pub image_ids: Vec<ImageId>,      // 按上传顺序排列的影像
}

/// 从业者信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Practitioner {
    pub id: PractitionerId,
    pub identity: Identity,
    pub name: String,
    pub star_rating: u8,              // 0-5，增量平均
    pub services_offered: String,
    pub patient_ids: Vec<PatientId>,  // 可能包含重复项
}

/// 治疗前后影像
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,
    pub patient_id: PatientId,
    pub before_cid: String,
    pub after_cid: String,            // 为空表示尚未上传
    pub completed: bool,
}

impl Image {
    /// 治疗后影像是否已上传
    ///
    /// 存储的CID与完成标志必须同时表明未上传，才允许写入。
    pub fn has_after_image(&self) -> bool {
        !self.after_cid.is_empty() || self.completed
    }
}

/// 评价记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub reviewer: Identity,
    pub rating: u8,
    pub comment: String,
}

/// 从业者评价列表，三列按提交顺序对齐
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewColumns {
    pub reviewers: Vec<Identity>,
    pub ratings: Vec<u8>,
    pub comments: Vec<String>,
}

impl ReviewColumns {
    pub fn len(&self) -> usize {
        self.reviewers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviewers.is_empty()
    }
}

impl<'a> FromIterator<&'a Review> for ReviewColumns {
    fn from_iter<I: IntoIterator<Item = &'a Review>>(iter: I) -> Self {
        let mut columns = ReviewColumns::default();
        for review in iter {
            columns.reviewers.push(review.reviewer.clone());
            columns.ratings.push(review.rating);
            columns.comments.push(review.comment.clone());
        }
        columns
    }
}

/// 登记系统统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_patients: u64,
    pub total_practitioners: u64,
    pub total_images: u64,
    pub completed_images: u64,
    pub total_reviews: u64,
}
