use std::fmt::{Display, Formatter};

/// Progress of the search-and-download UI sequence for one identifier.
#[derive(Clone, Copy, Debug, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub enum DownloadStep {
    Idle,
    Searched,
    RowSelected,
    DownloadRequested,
    ContinuationConfirmed,
    TransferTriggered,
}

impl DownloadStep {
    pub fn next(self) -> Option<Self> {
        match self {
            DownloadStep::Idle => Some(DownloadStep::Searched),
            DownloadStep::Searched => Some(DownloadStep::RowSelected),
            DownloadStep::RowSelected => Some(DownloadStep::DownloadRequested),
            DownloadStep::DownloadRequested => Some(DownloadStep::ContinuationConfirmed),
            DownloadStep::ContinuationConfirmed => Some(DownloadStep::TransferTriggered),
            DownloadStep::TransferTriggered => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DownloadStep::Idle => "idle",
            DownloadStep::Searched => "searched",
            DownloadStep::RowSelected => "row-selected",
            DownloadStep::DownloadRequested => "download-requested",
            DownloadStep::ContinuationConfirmed => "continuation-confirmed",
            DownloadStep::TransferTriggered => "transfer-triggered",
        }
    }
}

impl Display for DownloadStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
