//! Thin CUDA runtime layer: device handles, NVRTC compilation, and
//! synchronized launches.
//!
//! Every handle is explicit and owned by the caller. Nothing here keeps
//! a process-global "current device"; the sweep passes its
//! [`DeviceContext`] to whoever needs it.

use std::sync::Arc;

use cudarc::driver::{
    sys, CudaContext, CudaFunction, CudaModule, CudaStream, LaunchConfig, PushKernelArg,
};
use cudarc::nvrtc::compile_ptx;

use crate::core::device::DeviceDescriptor;
use crate::emitter::KernelSource;
use crate::error::BenchError;

/// An open device: driver context, its default stream, and the
/// capability snapshot taken at open time.
pub struct DeviceContext {
    ctx: Arc<CudaContext>,
    stream: Arc<CudaStream>,
    descriptor: DeviceDescriptor,
}

/// A JIT-compiled kernel bound to its launch geometry. The module is
/// retained so the function stays loaded for the kernel's lifetime.
pub struct CompiledKernel {
    #[allow(dead_code)]
    module: Arc<CudaModule>,
    func: CudaFunction,
    launch: LaunchConfig,
}

impl DeviceContext {
    /// Open device `index` and query its limits once.
    pub fn open(index: usize) -> Result<Self, BenchError> {
        let ctx = CudaContext::new(index)
            .map_err(|e| BenchError::DeviceUnavailable(format!("device {index}: {e}")))?;
        let stream = ctx.default_stream();

        let attr = |a: sys::CUdevice_attribute| -> Result<i32, BenchError> {
            ctx.attribute(a)
                .map_err(|e| BenchError::DeviceUnavailable(format!("attribute query: {e}")))
        };
        let descriptor = DeviceDescriptor {
            name: ctx
                .name()
                .map_err(|e| BenchError::DeviceUnavailable(format!("name query: {e}")))?,
            index,
            max_threads_per_block: attr(
                sys::CUdevice_attribute::CU_DEVICE_ATTRIBUTE_MAX_THREADS_PER_BLOCK,
            )? as u32,
            shared_mem_per_block: attr(
                sys::CUdevice_attribute::CU_DEVICE_ATTRIBUTE_MAX_SHARED_MEMORY_PER_BLOCK,
            )? as usize,
            warp_size: attr(sys::CUdevice_attribute::CU_DEVICE_ATTRIBUTE_WARP_SIZE)? as u32,
            multiprocessor_count: attr(
                sys::CUdevice_attribute::CU_DEVICE_ATTRIBUTE_MULTIPROCESSOR_COUNT,
            )? as u32,
        };

        Ok(Self {
            ctx,
            stream,
            descriptor,
        })
    }

    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    pub fn stream(&self) -> &Arc<CudaStream> {
        &self.stream
    }

    /// NVRTC-compile one generated kernel and resolve its entry point.
    pub fn compile(&self, kernel: &KernelSource) -> Result<CompiledKernel, BenchError> {
        let ptx = compile_ptx(&kernel.source)
            .map_err(|e| BenchError::Compile(format!("{}: {e}", kernel.module_name)))?;
        let module = self
            .ctx
            .load_module(ptx)
            .map_err(|e| BenchError::Compile(format!("{}: {e}", kernel.module_name)))?;
        let func = module
            .load_function(kernel.entry)
            .map_err(|e| BenchError::Compile(format!("missing entry {}: {e}", kernel.entry)))?;
        Ok(CompiledKernel {
            module,
            func,
            launch: LaunchConfig {
                grid_dim: kernel.grid,
                block_dim: kernel.block,
                shared_mem_bytes: kernel.shared_mem_bytes,
            },
        })
    }

    /// Launch one GEMV invocation. The caller synchronizes.
    pub fn launch_gemv<T: cudarc::driver::DeviceRepr>(
        &self,
        kernel: &CompiledKernel,
        a: &cudarc::driver::CudaSlice<T>,
        x: &cudarc::driver::CudaSlice<T>,
        y: &mut cudarc::driver::CudaSlice<T>,
        out_dim: i32,
        red_dim: i32,
        lda: i32,
    ) -> Result<(), BenchError> {
        unsafe {
            let mut builder = self.stream.launch_builder(&kernel.func);
            builder.arg(a);
            builder.arg(x);
            builder.arg(y);
            builder.arg(&out_dim);
            builder.arg(&red_dim);
            builder.arg(&lda);
            builder
                .launch(kernel.launch)
                .map_err(|e| BenchError::Launch(e.to_string()))?;
        }
        Ok(())
    }

    /// Drain the stream; required before reading elapsed wall time.
    pub fn synchronize(&self) -> Result<(), BenchError> {
        self.stream
            .synchronize()
            .map_err(|e| BenchError::Launch(format!("synchronize: {e}")))
    }
}
