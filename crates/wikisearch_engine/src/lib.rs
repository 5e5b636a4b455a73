/* 📖 # What does wikisearch_engine contain?

Everything between the socket and the index:
- `relevance`: the result algebra (`RelevanceMap` with `or`, `and`, `minus`, `sort`)
- `index`: the `IndexClient` seam and the bundled in-memory index
- `request`: request line parsing and routing
- `render`: the HTML pages and content types
- `handler`: one connection from request line to closed socket
- `listener`: the accept loop and its `ServerHandle`
- `config`: `wikisearch.toml`
*/

pub mod config;
pub mod handler;
pub mod index;
pub mod listener;
pub mod relevance;
pub mod render;
pub mod request;

pub use config::{ServerConfig, load_config, load_config_or_default};
pub use handler::ConnectionHandler;
pub use index::{IndexClient, IndexHandle, InMemoryIndex, search};
pub use listener::{Listener, ServerHandle};
pub use relevance::{Relevance, RelevanceMap, ScoredEntry, total_relevance};
pub use request::{ParseOutcome, ParsedRequest, Route, parse_request_line};
