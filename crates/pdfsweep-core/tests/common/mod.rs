pub mod node_server;
