use std::any::Any;

use crate::gpu::Api;

/// GPU state exposed to user draw callbacks while draw data is being recorded.
///
/// Draw lists are not tied to a graphics API, so the command buffer and
/// pipeline are handed over type-erased. Callbacks recover them with the API
/// they were built for:
///
/// ```ignore
/// let cmd = state.command_buffer::<MyApi>()?;
/// cmd.draw_indexed(..);
/// ```
///
/// Anything a callback changes stays in effect for the following draws. Push a
/// `ResetRenderState` callback afterwards to restore the UI pipeline state.
pub struct RenderState<'a> {
    command_buffer: &'a mut (dyn Any + 'static),
    pipeline: &'a (dyn Any + 'static),
}

impl<'a> RenderState<'a> {
    pub fn new<A: Api>(command_buffer: &'a mut A::CommandBuffer, pipeline: &'a A::Pipeline) -> Self {
        Self {
            command_buffer,
            pipeline,
        }
    }

    /// The command buffer draws are being recorded on; `None` if `A` is not
    /// the API being rendered with.
    pub fn command_buffer<A: Api>(&mut self) -> Option<&mut A::CommandBuffer> {
        self.command_buffer.downcast_mut::<A::CommandBuffer>()
    }

    /// The UI pipeline bound for the draw list.
    pub fn pipeline<A: Api>(&self) -> Option<&A::Pipeline> {
        self.pipeline.downcast_ref::<A::Pipeline>()
    }

    /// Both at once, for callbacks that bind against the UI pipeline layout.
    pub fn parts<A: Api>(&mut self) -> Option<(&mut A::CommandBuffer, &A::Pipeline)> {
        let pipeline = self.pipeline.downcast_ref::<A::Pipeline>()?;
        let cmd = self.command_buffer.downcast_mut::<A::CommandBuffer>()?;
        Some((cmd, pipeline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{CommandBuffer, Device, QueueKind, ScissorRect};
    use crate::headless::{Command, HeadlessApi, HeadlessDevice};
    use crate::ui::DrawVert;

    #[test]
    fn recovers_the_recording_command_buffer() {
        let device = HeadlessDevice::new();
        let pipeline = device.create_pipeline(Vec::new(), &DrawVert::ATTRIBUTES, DrawVert::STRIDE);
        let mut cmd = device.create_command_buffer(QueueKind::Graphics).unwrap();
        cmd.begin().unwrap();

        {
            let mut state = RenderState::new::<HeadlessApi>(&mut cmd, &pipeline);
            assert_eq!(state.pipeline::<HeadlessApi>().map(|p| p.id()), Some(pipeline.id()));
            let (cmd, _) = state.parts::<HeadlessApi>().unwrap();
            cmd.set_scissor(ScissorRect::new(1, 2, 3, 4));
        }

        assert_eq!(cmd.commands().last(), Some(&Command::SetScissor(ScissorRect::new(1, 2, 3, 4))));
    }
}
