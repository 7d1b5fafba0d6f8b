mod attachment_dto;

pub use attachment_dto::{
    AttachmentForm, AttachmentResponseDto, TaskAttachmentDto, UploadAttachmentDto,
    UploadedFile,
};
