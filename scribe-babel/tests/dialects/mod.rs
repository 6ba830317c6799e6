mod csv;
mod robustness;
mod taskpaper;
mod themes;
mod todotxt;
