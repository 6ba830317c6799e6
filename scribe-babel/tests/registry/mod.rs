mod detection;
mod extensions;
