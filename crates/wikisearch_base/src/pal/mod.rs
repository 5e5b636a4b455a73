/* 📖 # What is the Platform Abstraction Layer?

The PAL provides a trait-based abstraction over the read-only filesystem the server
serves static files from, plus the HTTP value types the connection handler writes.
Key benefits:
- Testability: MockPal allows deterministic handler tests without filesystem access
- Containment: RealPal resolves every path against one configured document root
- Consistency: All filesystem operations use the same error handling
*/

mod file_path;
pub mod http;
pub mod mock;
pub mod real_pal;
mod traits;

pub use file_path::FilePath;
pub use mock::MockPal;
pub use real_pal::RealPal;
pub use traits::{Pal, PalHandle, ReadSeek};
