/// Describes the version of a device backend.
pub trait VersionInfo {
    fn version() -> String;
}
