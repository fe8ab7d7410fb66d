//! Engine errors and their stable numeric codes.
//!
//! Every public operation returns [`Result`]. Callers that need the
//! classic integer status can ask an error for its [`ErrorCode`] and turn
//! any code back into its message with [`error_message`].

use std::path::PathBuf;

use object_store::StoreError;

use crate::database::NodeId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("string length of zero or blank string detected")]
    StringLengthZero,
    #[error("string '{0}' is longer than the maximum of {max} characters", max = crate::tree::MAX_NAME_LEN)]
    StringLengthTooBig(String),
    #[error("node name contains invalid characters: '{0}'")]
    InvalidNodeName(String),
    #[error("too many files opened")]
    TooManyFilesOpened,
    #[error("file status was not recognized: '{0}'")]
    FileStatusNotRecognized(String),
    #[error("failed to open {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: StoreError,
    },
    #[error("file open error: NEW - {0} already exists")]
    RequestedNewFileExists(PathBuf),
    #[error("file open error: OLD - {0} does not exist")]
    RequestedOldFileNotFound(PathBuf),
    #[error("file format was not recognized: {0}")]
    FileFormatNotRecognized(PathBuf),
    #[error("not a store file: {0}")]
    NotAStoreFile(PathBuf),
    #[error("memory allocation of {0} bytes failed")]
    MemoryAllocationFailed(usize),
    #[error("duplicate child name under a parent node: '{0}'")]
    DuplicateChildName(String),
    #[error("node has no dimensions")]
    ZeroDimensions,
    #[error("number of dimensions {0} is not in legal range")]
    BadNumberOfDimensions(usize),
    #[error("specified child is not a child of the specified parent")]
    ChildNotOfGivenParent,
    #[error("invalid data type: '{0}'")]
    InvalidDataType(String),
    #[error("node has no data associated with it")]
    NoData,
    #[error("bad start value")]
    StartOutOfRange,
    #[error("bad end value")]
    EndOutOfRange,
    #[error("minimum value is greater than the maximum value")]
    MinimumGreaterThanMaximum,
    #[error("bad stride value")]
    BadStrideValue,
    #[error("bad dimension value")]
    BadDimensionValue,
    #[error("error state must be either 0 or 1, got {0}")]
    BadErrorState(i32),
    #[error("unequal selection sizes: {disk} elements on disk, {memory} in memory")]
    UnequalMemoryAndDiskDims { disk: usize, memory: usize },
    #[error("buffer holds {actual} bytes, {expected} needed")]
    BufferTooSmall { expected: usize, actual: usize },
    #[error("link chain is deeper than {0} levels")]
    LinksTooDeep(usize),
    #[error("the node is not a link")]
    NodeIsNotALink,
    #[error("the linked-to node does not exist: '{0}'")]
    LinkTargetNotThere(String),
    #[error("the file of a linked-to node is not accessible: '{0}'")]
    LinkedToFileNotThere(String),
    #[error("node not found: '{0}'")]
    NodeNotFound(String),
    #[error("node attribute doesn't exist: '{0}'")]
    AttributeMissing(String),
    #[error("node id {0} is not valid")]
    InvalidNodeId(NodeId),
    #[error("nodes are not in the same file")]
    NodesNotInSameFile,
    #[error("cannot move a node into its own subtree")]
    MoveIntoSelf,
    #[error("can't move a linked-to node")]
    LinkMoveNotAllowed,
    #[error("can't change the data for a linked-to node")]
    LinkDataNotAllowed,
    #[error("parent of node is a link")]
    ParentIsLink,
    #[error("can't delete a linked-to node")]
    LinkDeleteNotAllowed,
    #[error("file close error: {0}")]
    FileClose(#[source] StoreError),
    #[error("flush error: {0}")]
    Flush(#[source] StoreError),
    #[error("failed to delete {path}: {source}")]
    FileDelete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("couldn't get file index from node id")]
    FileIndexNotFound,
    #[error("routine not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("dimensions need transposed - open in modify mode")]
    NeedsTranspose,
    #[error("no database is open")]
    NoOpenDatabase,
    #[error("object store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Stable integer status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    NoError = -1,
    StringLengthZero = 3,
    StringLengthTooBig = 4,
    TooManyFilesOpened = 6,
    FileStatusNotRecognized = 7,
    FileOpenError = 8,
    RequestedNewFileExists = 18,
    FileFormatNotRecognized = 19,
    RequestedOldFileNotFound = 22,
    MemoryAllocationFailed = 25,
    DuplicateChildName = 26,
    ZeroDimensions = 27,
    BadNumberOfDimensions = 28,
    ChildNotOfGivenParent = 29,
    InvalidDataType = 31,
    NoData = 33,
    EndOutOfDefinedRange = 36,
    BadStrideValue = 37,
    MinimumGtMaximum = 38,
    FileCloseError = 43,
    StartOutOfDefinedRange = 45,
    BadDimensionValue = 47,
    BadErrorState = 48,
    UnequalMemoryAndDiskDims = 49,
    LinksTooDeep = 50,
    NodeIsNotALink = 51,
    LinkTargetNotThere = 52,
    LinkedToFileNotThere = 53,
    InvalidNodeId = 54,
    IncompleteData = 55,
    InvalidNodeName = 56,
    NodesNotInSameFile = 58,
    FlushError = 60,
    NoAttribute = 71,
    MoveFailed = 74,
    NodeOpenFailed = 76,
    LinkMove = 89,
    LinkData = 90,
    LinkNode = 91,
    LinkDelete = 92,
    NotAStoreFile = 93,
    FileDelete = 94,
    FileIndex = 95,
    NotImplemented = 99,
    NoOpenDatabase = 105,
    NeedTranspose = 106,
    StoreFailure = 107,
}

const ALL_CODES: &[ErrorCode] = &[
    ErrorCode::NoError,
    ErrorCode::StringLengthZero,
    ErrorCode::StringLengthTooBig,
    ErrorCode::TooManyFilesOpened,
    ErrorCode::FileStatusNotRecognized,
    ErrorCode::FileOpenError,
    ErrorCode::RequestedNewFileExists,
    ErrorCode::FileFormatNotRecognized,
    ErrorCode::RequestedOldFileNotFound,
    ErrorCode::MemoryAllocationFailed,
    ErrorCode::DuplicateChildName,
    ErrorCode::ZeroDimensions,
    ErrorCode::BadNumberOfDimensions,
    ErrorCode::ChildNotOfGivenParent,
    ErrorCode::InvalidDataType,
    ErrorCode::NoData,
    ErrorCode::EndOutOfDefinedRange,
    ErrorCode::BadStrideValue,
    ErrorCode::MinimumGtMaximum,
    ErrorCode::FileCloseError,
    ErrorCode::StartOutOfDefinedRange,
    ErrorCode::BadDimensionValue,
    ErrorCode::BadErrorState,
    ErrorCode::UnequalMemoryAndDiskDims,
    ErrorCode::LinksTooDeep,
    ErrorCode::NodeIsNotALink,
    ErrorCode::LinkTargetNotThere,
    ErrorCode::LinkedToFileNotThere,
    ErrorCode::InvalidNodeId,
    ErrorCode::IncompleteData,
    ErrorCode::InvalidNodeName,
    ErrorCode::NodesNotInSameFile,
    ErrorCode::FlushError,
    ErrorCode::NoAttribute,
    ErrorCode::MoveFailed,
    ErrorCode::NodeOpenFailed,
    ErrorCode::LinkMove,
    ErrorCode::LinkData,
    ErrorCode::LinkNode,
    ErrorCode::LinkDelete,
    ErrorCode::NotAStoreFile,
    ErrorCode::FileDelete,
    ErrorCode::FileIndex,
    ErrorCode::NotImplemented,
    ErrorCode::NoOpenDatabase,
    ErrorCode::NeedTranspose,
    ErrorCode::StoreFailure,
];

impl ErrorCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(code: i32) -> Option<Self> {
        ALL_CODES.iter().copied().find(|c| c.as_i32() == code)
    }

    /// Fixed message text for the code.
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::NoError => "No Error",
            ErrorCode::StringLengthZero => "String length of zero or blank string detected",
            ErrorCode::StringLengthTooBig => {
                "String length longer than maximum allowable length"
            }
            ErrorCode::TooManyFilesOpened => "Too many files opened",
            ErrorCode::FileStatusNotRecognized => "File status was not recognized",
            ErrorCode::FileOpenError => "File-open error",
            ErrorCode::RequestedNewFileExists => "File Open Error: NEW - File already exists",
            ErrorCode::FileFormatNotRecognized => "File format was not recognized",
            ErrorCode::RequestedOldFileNotFound => "File Open Error: OLD - File does not exist",
            ErrorCode::MemoryAllocationFailed => "Memory allocation failed",
            ErrorCode::DuplicateChildName => "Duplicate child name under a parent node",
            ErrorCode::ZeroDimensions => "Node has no dimensions",
            ErrorCode::BadNumberOfDimensions => {
                "Node's number-of-dimensions is not in legal range"
            }
            ErrorCode::ChildNotOfGivenParent => {
                "Specified child is NOT a child of the specified parent"
            }
            ErrorCode::InvalidDataType => "Invalid Data-Type",
            ErrorCode::NoData => "Node has no data associated with it",
            ErrorCode::EndOutOfDefinedRange => "Bad end value",
            ErrorCode::BadStrideValue => "Bad stride value",
            ErrorCode::MinimumGtMaximum => "Minimum value is greater than the maximum value",
            ErrorCode::FileCloseError => "File Close error",
            ErrorCode::StartOutOfDefinedRange => "Bad start value",
            ErrorCode::BadDimensionValue => "Bad dimension value",
            ErrorCode::BadErrorState => "Error state must be either a 0 (zero) or a 1 (one)",
            ErrorCode::UnequalMemoryAndDiskDims => {
                "Unequal dimensional specifications for disk and memory"
            }
            ErrorCode::LinksTooDeep => "Too many link levels were followed",
            ErrorCode::NodeIsNotALink => "The node is not a link.  It was expected to be a link",
            ErrorCode::LinkTargetNotThere => "The linked-to node does not exist",
            ErrorCode::LinkedToFileNotThere => "The file of a linked-node is not accessable",
            ErrorCode::InvalidNodeId => "The node ID is not valid",
            ErrorCode::IncompleteData => "Memory buffer is smaller than the requested data",
            ErrorCode::InvalidNodeName => "Node name contains invalid characters",
            ErrorCode::NodesNotInSameFile => "Nodes are not in the same file",
            ErrorCode::FlushError => "Flush of the store file failed",
            ErrorCode::NoAttribute => "Node attribute doesn't exist",
            ErrorCode::MoveFailed => "Moving a node group failed",
            ErrorCode::NodeOpenFailed => "Open of a node group failed",
            ErrorCode::LinkMove => "Can't move a linked-to node",
            ErrorCode::LinkData => "Can't change the data for a linked-to node",
            ErrorCode::LinkNode => "Parent of node is a link",
            ErrorCode::LinkDelete => "Can't delete a linked-to node",
            ErrorCode::NotAStoreFile => "File does not exist or is not a store file",
            ErrorCode::FileDelete => "unlink (delete) of file failed",
            ErrorCode::FileIndex => "couldn't get file index from node ID",
            ErrorCode::NotImplemented => "routine not implemented",
            ErrorCode::NoOpenDatabase => "No database is open",
            ErrorCode::NeedTranspose => "dimensions need transposed - open in modify mode",
            ErrorCode::StoreFailure => "Underlying object store operation failed",
        }
    }
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::StringLengthZero => ErrorCode::StringLengthZero,
            Error::StringLengthTooBig(_) => ErrorCode::StringLengthTooBig,
            Error::InvalidNodeName(_) => ErrorCode::InvalidNodeName,
            Error::TooManyFilesOpened => ErrorCode::TooManyFilesOpened,
            Error::FileStatusNotRecognized(_) => ErrorCode::FileStatusNotRecognized,
            Error::FileOpen { .. } => ErrorCode::FileOpenError,
            Error::RequestedNewFileExists(_) => ErrorCode::RequestedNewFileExists,
            Error::RequestedOldFileNotFound(_) => ErrorCode::RequestedOldFileNotFound,
            Error::FileFormatNotRecognized(_) => ErrorCode::FileFormatNotRecognized,
            Error::NotAStoreFile(_) => ErrorCode::NotAStoreFile,
            Error::MemoryAllocationFailed(_) => ErrorCode::MemoryAllocationFailed,
            Error::DuplicateChildName(_) => ErrorCode::DuplicateChildName,
            Error::ZeroDimensions => ErrorCode::ZeroDimensions,
            Error::BadNumberOfDimensions(_) => ErrorCode::BadNumberOfDimensions,
            Error::ChildNotOfGivenParent => ErrorCode::ChildNotOfGivenParent,
            Error::InvalidDataType(_) => ErrorCode::InvalidDataType,
            Error::NoData => ErrorCode::NoData,
            Error::StartOutOfRange => ErrorCode::StartOutOfDefinedRange,
            Error::EndOutOfRange => ErrorCode::EndOutOfDefinedRange,
            Error::MinimumGreaterThanMaximum => ErrorCode::MinimumGtMaximum,
            Error::BadStrideValue => ErrorCode::BadStrideValue,
            Error::BadDimensionValue => ErrorCode::BadDimensionValue,
            Error::BadErrorState(_) => ErrorCode::BadErrorState,
            Error::UnequalMemoryAndDiskDims { .. } => ErrorCode::UnequalMemoryAndDiskDims,
            Error::BufferTooSmall { .. } => ErrorCode::IncompleteData,
            Error::LinksTooDeep(_) => ErrorCode::LinksTooDeep,
            Error::NodeIsNotALink => ErrorCode::NodeIsNotALink,
            Error::LinkTargetNotThere(_) => ErrorCode::LinkTargetNotThere,
            Error::LinkedToFileNotThere(_) => ErrorCode::LinkedToFileNotThere,
            Error::NodeNotFound(_) => ErrorCode::NodeOpenFailed,
            Error::AttributeMissing(_) => ErrorCode::NoAttribute,
            Error::InvalidNodeId(_) => ErrorCode::InvalidNodeId,
            Error::NodesNotInSameFile => ErrorCode::NodesNotInSameFile,
            Error::MoveIntoSelf => ErrorCode::MoveFailed,
            Error::LinkMoveNotAllowed => ErrorCode::LinkMove,
            Error::LinkDataNotAllowed => ErrorCode::LinkData,
            Error::ParentIsLink => ErrorCode::LinkNode,
            Error::LinkDeleteNotAllowed => ErrorCode::LinkDelete,
            Error::FileClose(_) => ErrorCode::FileCloseError,
            Error::Flush(_) => ErrorCode::FlushError,
            Error::FileDelete { .. } => ErrorCode::FileDelete,
            Error::FileIndexNotFound => ErrorCode::FileIndex,
            Error::NotImplemented(_) => ErrorCode::NotImplemented,
            Error::NeedsTranspose => ErrorCode::NeedTranspose,
            Error::NoOpenDatabase => ErrorCode::NoOpenDatabase,
            Error::Store(_) => ErrorCode::StoreFailure,
        }
    }
}

/// Message text for an integer status code, or `"error number N"` when
/// the code is unknown.
pub fn error_message(code: i32) -> String {
    match ErrorCode::from_i32(code) {
        Some(c) => c.message().to_string(),
        None => format!("error number {}", code),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let mut seen: Vec<i32> = ALL_CODES.iter().map(|c| c.as_i32()).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), ALL_CODES.len());
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(26), "Duplicate child name under a parent node");
        assert_eq!(error_message(-1), "No Error");
        assert_eq!(error_message(9999), "error number 9999");
    }

    #[test]
    fn test_error_code_mapping() {
        assert_eq!(Error::MinimumGreaterThanMaximum.code().as_i32(), 38);
        assert_eq!(Error::NeedsTranspose.code(), ErrorCode::NeedTranspose);
        assert_eq!(
            Error::Store(StoreError::EntryNotFound("x".into())).code(),
            ErrorCode::StoreFailure
        );
    }
}
