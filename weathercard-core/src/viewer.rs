use crate::resource::UiResource;

/// Something that can put a UI resource in front of the user.
///
/// Viewers are handed every resource the view produces, in order; a resource
/// with the same URI as the previous one replaces it.
pub trait ResourceViewer {
    fn show(&mut self, resource: &UiResource) -> anyhow::Result<()>;
}

impl<V: ResourceViewer + ?Sized> ResourceViewer for Box<V> {
    fn show(&mut self, resource: &UiResource) -> anyhow::Result<()> {
        (**self).show(resource)
    }
}

/// Keeps every resource it is shown. Useful for tests and for replaying.
#[derive(Debug, Default)]
pub struct RecordingViewer {
    pub shown: Vec<UiResource>,
}

impl ResourceViewer for RecordingViewer {
    fn show(&mut self, resource: &UiResource) -> anyhow::Result<()> {
        self.shown.push(resource.clone());
        Ok(())
    }
}
