mod bind_group;
mod bindable;
mod double_buffered;
mod texture;
mod uniform_buffer;

pub use self::bind_group::*;
pub use self::bindable::*;
pub use self::double_buffered::*;
pub use self::texture::*;
pub use self::uniform_buffer::*;
