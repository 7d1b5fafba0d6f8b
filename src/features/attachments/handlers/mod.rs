pub mod attachment_handler;

pub use attachment_handler::{
    __path_create_attachment, __path_delete_attachment, __path_get_attachment,
    __path_list_attachments, __path_replace_attachment, __path_update_attachment,
    create_attachment, delete_attachment, get_attachment, list_attachments, replace_attachment,
    update_attachment,
};
