// ==========================================
// 施工现场日报系统 - API层
// ==========================================
// 职责: 对外业务接口，输入校验与错误转换
// ==========================================

pub mod entry_api;
pub mod error;
pub mod report_api;

pub use entry_api::{EntryApi, MaterialQuantityInput};
pub use error::{ApiError, ApiResult};
pub use report_api::{Clock, ReportApi};
