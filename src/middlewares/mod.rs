pub mod staff_middleware;
