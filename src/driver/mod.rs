pub mod iocontroller;
