pub mod sjis;
