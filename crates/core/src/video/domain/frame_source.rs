/// Produces encoded frames for analysis.
///
/// Implementations wrap a concrete acquisition mechanism (a directory
/// of still captures, an RTSP client, a USB camera) behind one
/// capability that is constructed and injected into the pipeline,
/// never reached through a global.
pub trait FrameSource: Send {
    /// Returns the next encoded frame, `None` once the source is
    /// exhausted. Live sources block until a frame is available.
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, Box<dyn std::error::Error>>;

    /// Releases any resources held by the source.
    fn close(&mut self);
}
