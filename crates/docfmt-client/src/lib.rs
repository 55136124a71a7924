//! Client side of the docfmt formatting service
//!
//! A [`Session`] holds everything one user has done so far (uploaded file,
//! its identifier, last report, last formatted file, active configuration,
//! template list). [`Flows`] runs the request/response flows against a
//! [`Backend`], updating the session and reporting progress through a
//! [`Notifier`].

pub mod backend;
pub mod error;
pub mod flows;
pub mod http;
pub mod notify;
pub mod report_view;
pub mod session;
pub mod upload;

pub use backend::Backend;
pub use error::ClientError;
pub use flows::{DownloadedFile, Flows};
pub use http::HttpBackend;
pub use notify::{ConsoleNotifier, NoticeLevel, Notifier};
pub use report_view::{CategoryGroup, ReportView};
pub use session::{MarginOverrides, Session};
pub use upload::{validate_upload, LocalFile};
